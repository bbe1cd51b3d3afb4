//! Evaluator configuration

use serde::{Deserialize, Serialize};

/// Alert predicate thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Maximum distance to a point hazard (meters)
    pub point_radius_m: f64,
    /// Maximum bearing mismatch for a point hazard (degrees)
    pub point_tolerance_deg: f64,
    /// Maximum distance to any vertex of a line hazard (meters)
    pub line_vertex_radius_m: f64,
    /// Maximum deviation from the reciprocal of a line's bearing (degrees)
    pub line_tolerance_deg: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            point_radius_m: 200.0,
            point_tolerance_deg: 45.0,
            line_vertex_radius_m: 50.0,
            line_tolerance_deg: 45.0,
        }
    }
}
