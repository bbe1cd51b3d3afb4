//! Hazard Model
//!
//! Typed speed-camera hazards (fixed points and monitored road segments),
//! validated hazard sets, and conversion from the published camera dataset.

mod error;
mod hazard;
mod set;
pub mod source;

pub use error::ValidationError;
pub use hazard::{Hazard, HazardKind, LineHazard, PointHazard};
pub use set::HazardSet;
pub use source::SourceError;
