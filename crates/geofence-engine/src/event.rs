//! Events and snapshots published by the engine

use hazard_model::HazardKind;
use proximity::{PositionSample, Proximity};
use serde::{Deserialize, Serialize};

/// Hazard id with its distance from the latest sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestHazard {
    pub hazard_id: String,
    pub kind: HazardKind,
    pub distance_m: f64,
}

impl From<Proximity<'_>> for NearestHazard {
    fn from(p: Proximity<'_>) -> Self {
        Self {
            hazard_id: p.hazard.id().to_string(),
            kind: p.hazard.kind(),
            distance_m: p.distance_m,
        }
    }
}

/// Details carried by a fired alert, for the notification sink to format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertNotice {
    pub hazard_id: String,
    pub kind: HazardKind,
    pub distance_m: f64,
    /// Posted limit (km/h)
    pub speed_limit: Option<f64>,
    pub remarks: String,
    pub timestamp_ms: u64,
}

impl AlertNotice {
    pub(crate) fn new(p: Proximity<'_>, timestamp_ms: u64) -> Self {
        Self {
            hazard_id: p.hazard.id().to_string(),
            kind: p.hazard.kind(),
            distance_m: p.distance_m,
            speed_limit: p.hazard.speed_limit(),
            remarks: p.hazard.remarks().to_string(),
            timestamp_ms,
        }
    }
}

/// Alert lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AlertEvent {
    Fired(AlertNotice),
    Cleared { hazard_id: String, timestamp_ms: u64 },
}

impl AlertEvent {
    pub fn hazard_id(&self) -> &str {
        match self {
            AlertEvent::Fired(notice) => &notice.hazard_id,
            AlertEvent::Cleared { hazard_id, .. } => hazard_id,
        }
    }

    pub fn is_fired(&self) -> bool {
        matches!(self, AlertEvent::Fired(_))
    }
}

/// Result of processing one sample
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleOutcome {
    /// Closest hazard regardless of heading
    pub nearest: Option<NearestHazard>,
    /// Closest hazard satisfying the alert predicate
    pub primary: Option<NearestHazard>,
    /// How many hazards satisfied the alert predicate
    pub candidate_count: usize,
    /// Fired/cleared events, clears first
    pub events: Vec<AlertEvent>,
}

/// Read-only view of engine state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub running: bool,
    pub hazard_count: usize,
    pub nearest: Option<NearestHazard>,
    pub active_alerts: Vec<String>,
    pub last_sample: Option<PositionSample>,
}
