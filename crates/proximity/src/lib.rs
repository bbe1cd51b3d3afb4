//! Proximity Evaluation
//!
//! Scans a hazard set for one position sample and reports the nearest
//! hazard, every hazard that qualifies for an alert, and the primary one.

mod config;
mod evaluator;
mod sample;

pub use config::EvaluatorConfig;
pub use evaluator::{evaluate, line_matches, point_matches, Evaluation, Proximity};
pub use sample::PositionSample;
