//! Monitoring State Routes

use axum::{extract::State, Json};
use geofence_engine::EngineSnapshot;
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Current engine snapshot
pub async fn get_state(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EngineSnapshot>, ApiError> {
    Ok(Json(state.engine.current_state()?))
}

/// Stop accepting samples
pub async fn stop(State(state): State<Arc<AppState>>) -> Result<Json<EngineSnapshot>, ApiError> {
    state.engine.stop();
    Ok(Json(state.engine.current_state()?))
}

/// Accept samples again
pub async fn resume(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EngineSnapshot>, ApiError> {
    state.engine.resume();
    Ok(Json(state.engine.current_state()?))
}

/// Clear alert state without events
pub async fn reset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EngineSnapshot>, ApiError> {
    state.engine.reset()?;
    Ok(Json(state.engine.current_state()?))
}
