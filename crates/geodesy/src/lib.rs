//! Geographic Primitives
//!
//! Distance and bearing calculations between WGS84 coordinates.

mod coordinate;
mod distance;

pub use coordinate::Coordinate;
pub use distance::{
    angular_difference, bearing_degrees, distance_meters, distance_to_polyline,
    distance_to_segment, min_vertex_distance, normalize_degrees, EARTH_RADIUS_M,
};
