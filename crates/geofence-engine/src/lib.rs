//! Geofence Engine
//!
//! Owns the hazard set and the alert state for one monitoring session.
//! Each position sample runs through the proximity evaluator and the alert
//! debouncer; results go back to the caller and out to subscribers.

mod config;
mod engine;
mod error;
mod event;

pub use config::EngineConfig;
pub use engine::HazardEngine;
pub use error::EngineError;
pub use event::{AlertEvent, AlertNotice, EngineSnapshot, NearestHazard, SampleOutcome};

pub use alerting::AlertConfig;
pub use geodesy::Coordinate;
pub use hazard_model::{Hazard, HazardKind, HazardSet, LineHazard, PointHazard, ValidationError};
pub use proximity::{EvaluatorConfig, PositionSample};
