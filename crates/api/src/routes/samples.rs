//! Sample Routes

use axum::{extract::State, Json};
use geofence_engine::{PositionSample, SampleOutcome};
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Submit one position sample
pub async fn post_sample(
    State(state): State<Arc<AppState>>,
    Json(sample): Json<PositionSample>,
) -> Result<Json<SampleOutcome>, ApiError> {
    let outcome = state.engine.submit_sample(sample)?;
    Ok(Json(outcome))
}
