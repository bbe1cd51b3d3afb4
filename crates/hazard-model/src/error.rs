//! Validation Error Types

use thiserror::Error;

/// Errors raised while validating hazards for loading
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// NaN or infinite value
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },

    /// Line hazard without enough vertices to form a segment
    #[error("line needs at least 2 vertices, got {count}")]
    TooFewVertices { count: usize },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Two hazards share the same id
    #[error("Duplicate hazard id: {0}")]
    DuplicateId(String),

    /// Error attributed to a specific hazard
    #[error("hazard {id}: {source}")]
    Hazard {
        id: String,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Attach the offending hazard id
    pub(crate) fn for_hazard(self, id: &str) -> Self {
        ValidationError::Hazard {
            id: id.to_string(),
            source: Box::new(self),
        }
    }
}
