//! Dataset Record Conversion
//!
//! The published camera dataset ships fixed cameras as tabular rows
//! (`ID`, `lat`, `long`, `bearing`, `SITE_DES_1`), either as CSV with a
//! header line or as a JSON array, and monitored road
//! stretches as a GeoJSON feature collection. Both are converted into
//! [`Hazard`] values here. A record whose latitude, longitude or bearing is
//! missing or unparseable is rejected, never defaulted.

use crate::{Hazard, LineHazard, PointHazard, ValidationError};
use csv::{ReaderBuilder, Trim};
use geodesy::Coordinate;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Speed limit assumed for a line feature without a `SPEED` property (km/h)
pub const DEFAULT_LINE_SPEED_LIMIT: f64 = 50.0;

/// Remarks used when the dataset has no site description
pub const DEFAULT_REMARKS: &str = "No description";

/// Errors converting dataset records
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("record {index}: missing field {field}")]
    MissingField { index: usize, field: &'static str },

    #[error("record {index}: field {field} is not a number: {value}")]
    InvalidNumber {
        index: usize,
        field: &'static str,
        value: String,
    },

    #[error("record {index}: unsupported geometry {kind}")]
    UnsupportedGeometry { index: usize, kind: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One row of the fixed-camera table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CameraRecord {
    #[serde(rename = "ID", default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub lat: Option<Value>,
    #[serde(default)]
    pub long: Option<Value>,
    #[serde(default)]
    pub bearing: Option<Value>,
    #[serde(rename = "SPEED", default)]
    pub speed: Option<Value>,
    #[serde(rename = "SITE_DES_1", default)]
    pub remarks: Option<String>,
}

impl CameraRecord {
    /// Convert to a point hazard; `index` is used for error reporting
    pub fn into_hazard(self, index: usize) -> Result<Hazard, SourceError> {
        let id = required_id(self.id.as_ref(), index)?;
        let latitude = required_number(self.lat.as_ref(), "lat", index)?;
        let longitude = required_number(self.long.as_ref(), "long", index)?;
        let road_bearing = required_number(self.bearing.as_ref(), "bearing", index)?;
        let speed_limit = self
            .speed
            .as_ref()
            .and_then(|v| parse_number(v))
            .filter(|s| s.is_finite());

        let hazard = Hazard::Point(PointHazard {
            id,
            location: Coordinate::new(latitude, longitude),
            road_bearing,
            speed_limit,
            remarks: remarks_or_default([self.remarks.as_deref()]),
        });
        hazard.validate()?;
        Ok(hazard)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Map<String, Value>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Other,
}

/// Parse a JSON array of camera rows into point hazards
pub fn cameras_from_json(json: &str) -> Result<Vec<Hazard>, SourceError> {
    let records: Vec<CameraRecord> = serde_json::from_str(json)?;
    let hazards = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_hazard(index))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Converted {} camera records", hazards.len());
    Ok(hazards)
}

/// Parse camera rows from CSV text with a header line.
///
/// Columns are matched by header name; unknown columns are ignored and an
/// empty cell counts as missing.
pub fn cameras_from_csv(text: &str) -> Result<Vec<Hazard>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let hazards = reader
        .deserialize::<CameraRecord>()
        .enumerate()
        .map(|(index, row)| {
            row.map_err(SourceError::from)
                .and_then(|record| record.into_hazard(index))
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!("Converted {} camera rows", hazards.len());
    Ok(hazards)
}

/// Parse a GeoJSON feature collection of monitored stretches into line hazards.
///
/// For a `MultiLineString` only the first line is used.
pub fn lines_from_geojson(json: &str) -> Result<Vec<Hazard>, SourceError> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    let hazards = collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| line_from_feature(index, feature))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Converted {} line features", hazards.len());
    Ok(hazards)
}

fn line_from_feature(index: usize, feature: Feature) -> Result<Hazard, SourceError> {
    let props = &feature.properties;
    let id = required_id(props.get("ID"), index)?;
    let road_bearing = required_number(props.get("bearing"), "bearing", index)?;

    let speed_limit = match props.get("SPEED").filter(|v| !v.is_null()) {
        None => DEFAULT_LINE_SPEED_LIMIT,
        Some(value) => match parse_number(value).filter(|s| s.is_finite()) {
            Some(speed) => speed,
            None => {
                warn!(
                    "Line {} has unreadable SPEED {}, assuming {}",
                    id, value, DEFAULT_LINE_SPEED_LIMIT
                );
                DEFAULT_LINE_SPEED_LIMIT
            }
        },
    };

    let positions = match feature.geometry {
        Geometry::LineString { coordinates } => coordinates,
        Geometry::MultiLineString { coordinates } => {
            if coordinates.len() > 1 {
                debug!("Line {} has {} parts, using the first", id, coordinates.len());
            }
            coordinates.into_iter().next().unwrap_or_default()
        }
        Geometry::Other => {
            return Err(SourceError::UnsupportedGeometry {
                index,
                kind: "non-line geometry".to_string(),
            })
        }
    };

    let vertices = positions
        .iter()
        .map(|pos| match pos.as_slice() {
            [lon, lat, ..] => Ok(Coordinate::new(*lat, *lon)),
            _ => Err(SourceError::MissingField {
                index,
                field: "coordinates",
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let remarks = remarks_or_default([
        props.get("SITE_DES_1").and_then(Value::as_str),
        props.get("SITE_DESC_").and_then(Value::as_str),
    ]);

    let hazard = Hazard::Line(LineHazard {
        id,
        vertices,
        road_bearing,
        speed_limit: Some(speed_limit),
        remarks,
    });
    hazard.validate()?;
    Ok(hazard)
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn required_number(
    value: Option<&Value>,
    field: &'static str,
    index: usize,
) -> Result<f64, SourceError> {
    let value = value
        .filter(|v| !v.is_null())
        .ok_or(SourceError::MissingField { index, field })?;
    parse_number(value).ok_or_else(|| SourceError::InvalidNumber {
        index,
        field,
        value: value.to_string(),
    })
}

fn required_id(value: Option<&Value>, index: usize) -> Result<String, SourceError> {
    let id = match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if id.is_empty() {
        return Err(SourceError::MissingField { index, field: "ID" });
    }
    Ok(id)
}

fn remarks_or_default<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REMARKS)
        .to_string()
}
