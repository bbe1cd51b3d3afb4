//! Hazard Routes

use axum::{extract::State, Json};
use geofence_engine::Hazard;
use serde::Serialize;
use std::sync::Arc;

use crate::{ApiError, AppState};

/// Response for a hazard load
#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub count: usize,
}

/// Replace the hazard set; a rejected set leaves the old one installed
pub async fn put_hazards(
    State(state): State<Arc<AppState>>,
    Json(hazards): Json<Vec<Hazard>>,
) -> Result<Json<LoadResponse>, ApiError> {
    let count = state.engine.load_hazards(hazards)?;
    Ok(Json(LoadResponse { count }))
}
