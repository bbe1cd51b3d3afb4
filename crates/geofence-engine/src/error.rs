//! Engine Error Types

use hazard_model::ValidationError;
use thiserror::Error;

/// Errors returned by [`crate::HazardEngine`]
#[derive(Debug, Error)]
pub enum EngineError {
    /// Hazard set rejected; the previous set stays installed
    #[error("Hazard validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Sample coordinate unusable
    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    /// Monitoring stopped, samples are not accepted
    #[error("Monitoring is stopped")]
    Stopped,

    /// A thread panicked while holding engine state
    #[error("Engine state lock poisoned")]
    LockPoisoned,
}
