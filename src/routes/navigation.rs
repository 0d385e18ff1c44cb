use std::time::Duration;

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::navigation::{Leg, NavigationMode, Trigger, Viewport};
use crate::routes::find_session;
use crate::session::LegOutcome;
use crate::state::AppState;
use crate::types::geo::Coordinate;
use crate::types::scene::RenderCommand;
use crate::types::track::Progress;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/voyages/:voyage_id/navigation/legs/:leg", post(open_leg))
        .route("/api/voyages/:voyage_id/navigation/viewport", post(viewport))
        .route("/api/voyages/:voyage_id/navigation/close", post(close))
        .route("/api/voyages/:voyage_id/navigation/3d", post(toggle_3d))
        .route("/api/voyages/:voyage_id/navigation/advance", post(advance))
}

#[derive(Serialize)]
struct LegResponse {
    mode: NavigationMode,
    #[serde(flatten)]
    outcome: LegOutcome,
}

async fn open_leg(
    State(state): State<AppState>,
    Path((voyage_id, leg)): Path<(String, String)>,
) -> Result<Json<LegResponse>, AppError> {
    let session = find_session(&state, &voyage_id)?;
    let leg = Leg::from_str(&leg).ok_or_else(|| {
        AppError::BadRequest(format!("Invalid leg: {}. Use 'pickup' or 'delivery'", leg))
    })?;

    let outcome = session
        .open_leg(leg, Trigger::MarkerClick, state.resolver())
        .await;

    Ok(Json(LegResponse {
        mode: session.mode(),
        outcome,
    }))
}

#[derive(Serialize)]
struct ViewportResponse {
    mode: NavigationMode,
    triggered: Option<Leg>,
    pending_leg: Option<Leg>,
}

async fn viewport(
    State(state): State<AppState>,
    Path(voyage_id): Path<String>,
    Json(viewport): Json<Viewport>,
) -> Result<Json<ViewportResponse>, AppError> {
    let session = find_session(&state, &voyage_id)?;
    if !viewport.center.is_finite() || !viewport.zoom.is_finite() {
        return Err(AppError::BadRequest("Viewport must be finite".to_string()));
    }

    let triggered = session.observe_viewport(&viewport).map(|ticket| {
        let leg = ticket.leg();
        let session = session.clone();
        let resolver = state.resolver().clone();
        tokio::spawn(async move {
            let outcome = session.finish_leg(ticket, &resolver).await;
            tracing::debug!(voyage = %session.id(), ?leg, ?outcome, "Viewport leg transition finished");
        });
        leg
    });

    let summary = session.summary(state.now());
    Ok(Json(ViewportResponse {
        mode: summary.mode,
        triggered,
        pending_leg: summary.pending_leg,
    }))
}

#[derive(Serialize)]
struct CommandsResponse {
    mode: NavigationMode,
    commands: Vec<RenderCommand>,
}

async fn close(
    State(state): State<AppState>,
    Path(voyage_id): Path<String>,
) -> Result<Json<CommandsResponse>, AppError> {
    let session = find_session(&state, &voyage_id)?;
    let commands = session.close(state.now());
    Ok(Json(CommandsResponse {
        mode: session.mode(),
        commands,
    }))
}

#[derive(Deserialize)]
struct ToggleRequest {
    enabled: bool,
}

async fn toggle_3d(
    State(state): State<AppState>,
    Path(voyage_id): Path<String>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<CommandsResponse>, AppError> {
    let session = find_session(&state, &voyage_id)?;
    let commands = session.set_3d(req.enabled);
    Ok(Json(CommandsResponse {
        mode: session.mode(),
        commands,
    }))
}

#[derive(Deserialize)]
struct AdvanceRequest {
    delta_ms: u64,
}

#[derive(Serialize)]
struct AdvanceResponse {
    cursor: Option<Coordinate>,
    progress: Option<Progress>,
}

async fn advance(
    State(state): State<AppState>,
    Path(voyage_id): Path<String>,
    Json(req): Json<AdvanceRequest>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let session = find_session(&state, &voyage_id)?;
    let cursor = session.advance_leg_cursor(Duration::from_millis(req.delta_ms));
    Ok(Json(AdvanceResponse {
        cursor,
        progress: session.leg_cursor_progress(),
    }))
}
