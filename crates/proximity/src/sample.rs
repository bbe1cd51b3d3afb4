//! Position samples

use geodesy::Coordinate;
use serde::{Deserialize, Serialize};

/// One position fix from the location source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Reported position
    pub coordinate: Coordinate,
    /// Course over ground (degrees, [0, 360)), if the source knows it
    #[serde(default)]
    pub heading_degrees: Option<f64>,
    /// Ground speed (m/s)
    #[serde(default)]
    pub speed_mps: Option<f64>,
    /// Fix time in milliseconds since the producer's epoch
    pub timestamp_ms: u64,
}

impl PositionSample {
    /// Create a sample without heading or speed
    pub fn new(coordinate: Coordinate, timestamp_ms: u64) -> Self {
        Self {
            coordinate,
            heading_degrees: None,
            speed_mps: None,
            timestamp_ms,
        }
    }

    /// Set the heading
    pub fn with_heading(mut self, heading_degrees: f64) -> Self {
        self.heading_degrees = Some(heading_degrees);
        self
    }

    /// Set the speed
    pub fn with_speed(mut self, speed_mps: f64) -> Self {
        self.speed_mps = Some(speed_mps);
        self
    }

    /// Usable heading: present and finite. North (0) counts as a heading.
    pub fn heading(&self) -> Option<f64> {
        self.heading_degrees.filter(|h| h.is_finite())
    }

    /// Ground speed in km/h
    pub fn speed_kmh(&self) -> Option<f64> {
        self.speed_mps.filter(|s| s.is_finite()).map(|s| s * 3.6)
    }
}
