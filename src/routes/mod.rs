pub mod corridor;
pub mod health;
pub mod navigation;
pub mod voyages;

use std::sync::Arc;

use axum::Router;

use crate::error::AppError;
use crate::session::VoyageSession;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(voyages::router())
        .merge(navigation::router())
        .merge(corridor::router())
        .with_state(state)
}

fn find_session(state: &AppState, voyage_id: &str) -> Result<Arc<VoyageSession>, AppError> {
    state
        .get(voyage_id)
        .ok_or_else(|| AppError::NotFound(voyage_id.to_string()))
}
