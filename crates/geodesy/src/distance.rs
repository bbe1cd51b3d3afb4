//! Distance and Bearing Calculations

use crate::Coordinate;
use std::f64::consts::{FRAC_PI_4, PI, TAU};

/// Earth radius in meters (WGS84 equatorial)
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Great-circle distance between two coordinates in meters (haversine)
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Rhumb-line bearing from `from` to `to` in degrees [0, 360).
///
/// Returns 0 when the direction is undefined (identical points).
pub fn bearing_degrees(from: Coordinate, to: Coordinate) -> f64 {
    let mut dlon = (to.longitude - from.longitude).to_radians();
    let dphi = ((to.latitude.to_radians() / 2.0 + FRAC_PI_4).tan()
        / (from.latitude.to_radians() / 2.0 + FRAC_PI_4).tan())
    .ln();

    // Take the short way across the antimeridian
    if dlon.abs() > PI {
        dlon = if dlon > 0.0 { dlon - TAU } else { dlon + TAU };
    }

    let bearing = dlon.atan2(dphi).to_degrees();
    if bearing.is_finite() {
        normalize_degrees(bearing)
    } else {
        0.0
    }
}

/// Wrap an angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Smallest absolute difference between two bearings, in [0, 180]
pub fn angular_difference(x: f64, y: f64) -> f64 {
    let diff = normalize_degrees(x - y);
    diff.min(360.0 - diff)
}

/// Distance in meters from `point` to the nearest point of segment `a`-`b`.
///
/// Projects on a local plane scaled by the cosine of the mean latitude,
/// which holds for segments up to a few kilometres.
pub fn distance_to_segment(point: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let cos_lat = ((a.latitude + b.latitude) / 2.0).to_radians().cos();

    let dx = (b.longitude - a.longitude) * cos_lat;
    let dy = b.latitude - a.latitude;
    let px = (point.longitude - a.longitude) * cos_lat;
    let py = point.latitude - a.latitude;

    let seg_len_sq = dx * dx + dy * dy;
    if seg_len_sq < 1e-20 {
        return distance_meters(point, a);
    }

    let t = ((px * dx + py * dy) / seg_len_sq).clamp(0.0, 1.0);
    let projected = Coordinate::new(
        a.latitude + t * (b.latitude - a.latitude),
        a.longitude + t * (b.longitude - a.longitude),
    );

    distance_meters(point, projected)
}

/// Minimum segment distance from `point` to a polyline.
///
/// A single vertex degrades to plain vertex distance; no vertices yields `None`.
pub fn distance_to_polyline(point: Coordinate, vertices: &[Coordinate]) -> Option<f64> {
    match vertices {
        [] => None,
        [only] => Some(distance_meters(point, *only)),
        _ => vertices
            .windows(2)
            .map(|w| distance_to_segment(point, w[0], w[1]))
            .min_by(f64::total_cmp),
    }
}

/// Minimum distance from `point` to any vertex
pub fn min_vertex_distance(point: Coordinate, vertices: &[Coordinate]) -> Option<f64> {
    vertices
        .iter()
        .map(|v| distance_meters(point, *v))
        .min_by(f64::total_cmp)
}
