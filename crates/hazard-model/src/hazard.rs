//! Point and Line Hazards

use crate::ValidationError;
use geodesy::Coordinate;
use serde::{Deserialize, Serialize};

/// Fixed speed camera at a single location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointHazard {
    /// Dataset identifier
    pub id: String,
    /// Camera position
    pub location: Coordinate,
    /// Bearing of the enforced traffic direction (degrees, [0, 360))
    pub road_bearing: f64,
    /// Posted speed limit (km/h)
    #[serde(default)]
    pub speed_limit: Option<f64>,
    /// Site description
    #[serde(default)]
    pub remarks: String,
}

/// Camera-monitored road stretch, stored as a polyline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineHazard {
    /// Dataset identifier
    pub id: String,
    /// Ordered polyline vertices (at least 2)
    pub vertices: Vec<Coordinate>,
    /// Stored orientation of the monitored stretch (degrees, [0, 360))
    pub road_bearing: f64,
    /// Posted speed limit (km/h)
    #[serde(default)]
    pub speed_limit: Option<f64>,
    /// Site description
    #[serde(default)]
    pub remarks: String,
}

/// Hazard geometry type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardKind {
    Point,
    Line,
}

/// Any hazard the engine can alert on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Hazard {
    Point(PointHazard),
    Line(LineHazard),
}

impl Hazard {
    pub fn id(&self) -> &str {
        match self {
            Hazard::Point(p) => &p.id,
            Hazard::Line(l) => &l.id,
        }
    }

    pub fn kind(&self) -> HazardKind {
        match self {
            Hazard::Point(_) => HazardKind::Point,
            Hazard::Line(_) => HazardKind::Line,
        }
    }

    pub fn road_bearing(&self) -> f64 {
        match self {
            Hazard::Point(p) => p.road_bearing,
            Hazard::Line(l) => l.road_bearing,
        }
    }

    pub fn speed_limit(&self) -> Option<f64> {
        match self {
            Hazard::Point(p) => p.speed_limit,
            Hazard::Line(l) => l.speed_limit,
        }
    }

    pub fn remarks(&self) -> &str {
        match self {
            Hazard::Point(p) => &p.remarks,
            Hazard::Line(l) => &l.remarks,
        }
    }

    /// Check every field the alert predicate depends on.
    ///
    /// Errors are tagged with the hazard id.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_fields().map_err(|e| e.for_hazard(self.id()))
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        if self.id().trim().is_empty() {
            return Err(ValidationError::MissingField("id"));
        }

        validate_bearing(self.road_bearing())?;

        if let Some(limit) = self.speed_limit() {
            validate_finite("speed_limit", limit)?;
            validate_range("speed_limit", limit, (0.0, f64::MAX))?;
        }

        match self {
            Hazard::Point(p) => validate_coordinate(&p.location),
            Hazard::Line(l) => {
                if l.vertices.len() < 2 {
                    return Err(ValidationError::TooFewVertices {
                        count: l.vertices.len(),
                    });
                }
                l.vertices.iter().try_for_each(validate_coordinate)
            }
        }
    }
}

impl From<PointHazard> for Hazard {
    fn from(point: PointHazard) -> Self {
        Hazard::Point(point)
    }
}

impl From<LineHazard> for Hazard {
    fn from(line: LineHazard) -> Self {
        Hazard::Line(line)
    }
}

fn validate_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite { field })
    }
}

fn validate_range(
    field: &'static str,
    value: f64,
    range: (f64, f64),
) -> Result<(), ValidationError> {
    if value < range.0 || value > range.1 {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: range.0,
            max: range.1,
        })
    } else {
        Ok(())
    }
}

fn validate_bearing(bearing: f64) -> Result<(), ValidationError> {
    validate_finite("road_bearing", bearing)?;
    // Half-open: 360 must be written as 0
    if !(0.0..360.0).contains(&bearing) {
        return Err(ValidationError::OutOfRange {
            field: "road_bearing",
            value: bearing,
            min: 0.0,
            max: 360.0,
        });
    }
    Ok(())
}

fn validate_coordinate(coordinate: &Coordinate) -> Result<(), ValidationError> {
    validate_finite("latitude", coordinate.latitude)?;
    validate_finite("longitude", coordinate.longitude)?;
    validate_range("latitude", coordinate.latitude, (-90.0, 90.0))?;
    validate_range("longitude", coordinate.longitude, (-180.0, 180.0))
}
