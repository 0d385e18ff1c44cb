use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::pipeline::animate::Playback;
use crate::pipeline::progress::parse_calendar_date;
use crate::routes::find_session;
use crate::session::{VoyageSession, VoyageSummary};
use crate::state::AppState;
use crate::types::geo::Coordinate;
use crate::types::scene::Scene;
use crate::types::track::{
    LegSchedule, PointTag, Progress, ResolvedAddress, RouteEndpoints, TrackPoint,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/voyages", post(create_voyage))
        .route("/api/voyages/:voyage_id", get(get_voyage))
        .route("/api/voyages/:voyage_id/position", get(position))
        .route("/api/voyages/:voyage_id/playback", post(playback))
        .route("/api/voyages/:voyage_id/scene", get(scene))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateVoyageRequest {
    origin: Coordinate,
    destination: Coordinate,
    #[serde(default)]
    samples: Vec<SampleRequest>,
    pickup_address: Option<String>,
    delivery_address: Option<String>,
    schedule: Option<ScheduleRequest>,
}

#[derive(Deserialize)]
struct SampleRequest {
    coordinate: Coordinate,
    timestamp: Option<String>,
    #[serde(default = "default_tag")]
    tag: String,
}

fn default_tag() -> String {
    "historic".to_string()
}

#[derive(Deserialize)]
struct ScheduleRequest {
    planned_start: Option<String>,
    planned_end: Option<String>,
    actual_start: Option<String>,
    actual_end: Option<String>,
}

#[derive(Serialize)]
struct CreateVoyageResponse {
    #[serde(flatten)]
    summary: VoyageSummary,
    journey: Vec<Coordinate>,
}

async fn create_voyage(
    State(state): State<AppState>,
    Json(req): Json<CreateVoyageRequest>,
) -> Result<Json<CreateVoyageResponse>, AppError> {
    validate_coordinate("origin", &req.origin)?;
    validate_coordinate("destination", &req.destination)?;

    let samples = req
        .samples
        .iter()
        .map(parse_sample)
        .collect::<Result<Vec<_>, AppError>>()?;
    let schedule = req.schedule.as_ref().map(parse_schedule);

    let endpoints = RouteEndpoints {
        pickup: non_empty(req.pickup_address).map(ResolvedAddress::new),
        origin: req.origin,
        destination: req.destination,
        delivery: non_empty(req.delivery_address).map(ResolvedAddress::new),
    };

    let now = state.now();
    let session = VoyageSession::new(
        Uuid::new_v4().to_string(),
        samples,
        endpoints,
        schedule,
        state.resolver().corridor(),
        state.config(),
        now,
    );
    let session = state.insert(session);

    tracing::info!(
        "Created voyage {} ({} journey points)",
        session.id(),
        session.journey().len()
    );

    Ok(Json(CreateVoyageResponse {
        summary: session.summary(now),
        journey: session.journey().to_vec(),
    }))
}

async fn get_voyage(
    State(state): State<AppState>,
    Path(voyage_id): Path<String>,
) -> Result<Json<VoyageSummary>, AppError> {
    let session = find_session(&state, &voyage_id)?;
    Ok(Json(session.summary(state.now())))
}

#[derive(Deserialize)]
struct PositionQuery {
    progress: Option<f64>,
    at: Option<String>,
}

#[derive(Serialize)]
struct PositionResponse {
    position: Option<Coordinate>,
    progress: Option<Progress>,
    at: Option<DateTime<Utc>>,
}

async fn position(
    State(state): State<AppState>,
    Path(voyage_id): Path<String>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<PositionResponse>, AppError> {
    let session = find_session(&state, &voyage_id)?;

    let response = match (query.progress, query.at.as_deref()) {
        (Some(pct), None) => {
            let progress = Progress::new(pct);
            PositionResponse {
                position: session.position_at_progress(progress.value()),
                progress: Some(progress),
                at: None,
            }
        }
        (None, Some(raw)) => {
            let at = parse_timestamp(raw)?;
            PositionResponse {
                position: session.position_at_time(at),
                progress: None,
                at: Some(at),
            }
        }
        (None, None) => {
            let now = state.now();
            PositionResponse {
                position: session.current_position(now),
                progress: Some(session.progress_at(now)),
                at: Some(now),
            }
        }
        (Some(_), Some(_)) => {
            return Err(AppError::BadRequest(
                "Provide either progress or at, not both".to_string(),
            ))
        }
    };

    Ok(Json(response))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PlaybackRequest {
    advance_ms: Option<u64>,
    scrub: Option<f64>,
    playing: Option<bool>,
}

#[derive(Serialize)]
struct PlaybackResponse {
    playback: Playback,
    position: Option<Coordinate>,
}

/// Applies, in order: play/pause, scrub, advance.
async fn playback(
    State(state): State<AppState>,
    Path(voyage_id): Path<String>,
    Json(req): Json<PlaybackRequest>,
) -> Result<Json<PlaybackResponse>, AppError> {
    let session = find_session(&state, &voyage_id)?;

    if let Some(playing) = req.playing {
        session.set_playing(playing);
    }
    if let Some(pct) = req.scrub {
        if !pct.is_finite() {
            return Err(AppError::BadRequest("scrub must be a finite number".to_string()));
        }
        session.scrub(pct);
    }
    if let Some(advance_ms) = req.advance_ms {
        session.advance_playback(Duration::from_millis(advance_ms));
    }

    let playback = session.playback();
    Ok(Json(PlaybackResponse {
        position: session.position_at_progress(playback.progress().value()),
        playback,
    }))
}

async fn scene(
    State(state): State<AppState>,
    Path(voyage_id): Path<String>,
) -> Result<Json<Scene>, AppError> {
    let session = find_session(&state, &voyage_id)?;
    Ok(Json(session.scene(state.now())))
}

fn parse_sample(sample: &SampleRequest) -> Result<TrackPoint, AppError> {
    validate_coordinate("sample", &sample.coordinate)?;
    let tag = PointTag::from_str(&sample.tag).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid tag: {}. Use 'historic', 'latest', or 'predicted'",
            sample.tag
        ))
    })?;
    let timestamp = sample
        .timestamp
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;
    Ok(TrackPoint::new(sample.coordinate, timestamp, tag))
}

fn parse_schedule(req: &ScheduleRequest) -> LegSchedule {
    let parse = |raw: &Option<String>| {
        let raw = raw.as_deref()?;
        let parsed = parse_calendar_date(raw);
        if parsed.is_none() {
            tracing::warn!("Ignoring unparseable schedule date: {}", raw);
        }
        parsed
    };
    LegSchedule {
        planned_start: parse(&req.planned_start),
        planned_end: parse(&req.planned_end),
        actual_start: parse(&req.actual_start),
        actual_end: parse(&req.actual_end),
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    raw.parse::<DateTime<Utc>>()
        .map_err(|_| AppError::BadRequest(format!("Invalid timestamp: {}", raw)))
}

fn validate_coordinate(field: &str, coordinate: &Coordinate) -> Result<(), AppError> {
    let in_range = coordinate.is_finite()
        && (-180.0..=180.0).contains(&coordinate.lon)
        && (-90.0..=90.0).contains(&coordinate.lat);
    if !in_range {
        return Err(AppError::BadRequest(format!(
            "Invalid {} coordinate: [{}, {}]",
            field, coordinate.lon, coordinate.lat
        )));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
