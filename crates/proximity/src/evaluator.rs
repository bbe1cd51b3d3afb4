//! Proximity Evaluator
//!
//! Stateless: every call looks only at the hazard set and the one sample.

use crate::{EvaluatorConfig, PositionSample};
use geodesy::{
    angular_difference, bearing_degrees, distance_meters, distance_to_polyline,
    min_vertex_distance, normalize_degrees,
};
use hazard_model::{Hazard, HazardSet, LineHazard, PointHazard};
use tracing::debug;

/// A hazard paired with its distance from the sample
#[derive(Debug, Clone, Copy)]
pub struct Proximity<'a> {
    pub hazard: &'a Hazard,
    /// Meters from the sample to the hazard geometry
    pub distance_m: f64,
}

/// Result of scanning the hazard set for one sample
#[derive(Debug, Clone, Default)]
pub struct Evaluation<'a> {
    /// Closest hazard of any type, regardless of heading
    pub nearest: Option<Proximity<'a>>,
    /// Hazards satisfying the alert predicate, in set order
    pub candidates: Vec<Proximity<'a>>,
}

impl<'a> Evaluation<'a> {
    /// Closest candidate; the first one in set order wins a tie
    pub fn primary(&self) -> Option<Proximity<'a>> {
        self.candidates
            .iter()
            .copied()
            .min_by(|a, b| a.distance_m.total_cmp(&b.distance_m))
    }
}

/// Evaluate one sample against every hazard
pub fn evaluate<'a>(
    hazards: &'a HazardSet,
    sample: &PositionSample,
    config: &EvaluatorConfig,
) -> Evaluation<'a> {
    let mut evaluation = Evaluation::default();

    for hazard in hazards {
        let distance_m = hazard_distance(hazard, sample);

        // Strict comparison keeps the first hazard on ties
        let closer = evaluation
            .nearest
            .map_or(true, |nearest| distance_m < nearest.distance_m);
        if closer {
            evaluation.nearest = Some(Proximity { hazard, distance_m });
        }

        let qualifies = match hazard {
            Hazard::Point(point) => point_matches(point, sample, config),
            Hazard::Line(line) => line_matches(line, sample, config),
        };
        if qualifies {
            evaluation.candidates.push(Proximity { hazard, distance_m });
        }
    }

    if !evaluation.candidates.is_empty() {
        debug!(
            "{} candidate hazards at ({:.5}, {:.5})",
            evaluation.candidates.len(),
            sample.coordinate.latitude,
            sample.coordinate.longitude
        );
    }

    evaluation
}

/// Distance used for nearest-hazard tracking and candidate ranking
fn hazard_distance(hazard: &Hazard, sample: &PositionSample) -> f64 {
    match hazard {
        Hazard::Point(point) => distance_meters(sample.coordinate, point.location),
        Hazard::Line(line) => {
            distance_to_polyline(sample.coordinate, &line.vertices).unwrap_or(f64::INFINITY)
        }
    }
}

/// Alert predicate for a fixed camera.
///
/// Needs a heading: the bearing from the user to the camera and the
/// camera's road bearing, both taken relative to the heading, must agree
/// within tolerance.
pub fn point_matches(
    point: &PointHazard,
    sample: &PositionSample,
    config: &EvaluatorConfig,
) -> bool {
    let Some(heading) = sample.heading() else {
        return false;
    };

    if distance_meters(sample.coordinate, point.location) > config.point_radius_m {
        return false;
    }

    let bearing_to_hazard = bearing_degrees(sample.coordinate, point.location);
    let heading_diff = angular_difference(
        normalize_degrees(bearing_to_hazard - heading),
        normalize_degrees(point.road_bearing - heading),
    );

    heading_diff <= config.point_tolerance_deg
}

/// Alert predicate for a monitored stretch.
///
/// Proximity is tested against the vertices. The stored bearing follows the
/// reciprocal convention, so travel matches when the heading sits within
/// tolerance of `road_bearing + 180`. Without a heading the line still
/// matches.
pub fn line_matches(line: &LineHazard, sample: &PositionSample, config: &EvaluatorConfig) -> bool {
    let near = min_vertex_distance(sample.coordinate, &line.vertices)
        .is_some_and(|d| d <= config.line_vertex_radius_m);
    if !near {
        return false;
    }

    match sample.heading() {
        Some(heading) => {
            let relative = normalize_degrees(line.road_bearing - heading);
            (relative - 180.0).abs() <= config.line_tolerance_deg
        }
        None => true,
    }
}
