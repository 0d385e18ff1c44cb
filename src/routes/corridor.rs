use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::pipeline::geo::path_length;
use crate::state::AppState;
use crate::types::geo::Coordinate;
use crate::types::track::Route;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/corridor", post(corridor))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CorridorRequest {
    origin: Coordinate,
    destination: Coordinate,
    #[serde(default)]
    predicted: Vec<Coordinate>,
}

#[derive(Serialize)]
struct CorridorResponse {
    route: Route,
    distance_km: f64,
}

async fn corridor(
    State(state): State<AppState>,
    Json(req): Json<CorridorRequest>,
) -> Result<Json<CorridorResponse>, AppError> {
    if !req.origin.is_finite() || !req.destination.is_finite() {
        return Err(AppError::BadRequest(
            "origin and destination must be finite".to_string(),
        ));
    }

    let route = state
        .resolver()
        .corridor()
        .synthesize(req.origin, req.destination, &req.predicted);

    tracing::info!(
        "Synthesized corridor with {} points ({} predicted samples)",
        route.len(),
        req.predicted.len()
    );

    Ok(Json(CorridorResponse {
        distance_km: path_length(route.points()),
        route,
    }))
}
