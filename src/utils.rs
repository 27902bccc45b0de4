//! Geometry helpers over normalized landmark coordinates.

pub mod safe_cast;

use crate::landmarks::Point;

/// Euclidean distance between two landmarks in the image plane
#[must_use]
pub fn planar_distance(a: Point, b: Point) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    dx.hypot(dy)
}

/// Absolute vertical gap between two landmarks
#[must_use]
pub fn vertical_gap(a: Point, b: Point) -> f64 {
    (f64::from(a.y) - f64::from(b.y)).abs()
}

/// Angle in degrees of the vector `from -> to` measured from straight up.
///
/// Image y grows downwards, so an upright vector has angle 0 and a vector
/// leaning towards larger x is positive.
#[must_use]
pub fn angle_from_vertical(from: Point, to: Point) -> f64 {
    let dx = f64::from(to.x) - f64::from(from.x);
    let dy = f64::from(to.y) - f64::from(from.y);
    dx.atan2(-dy).to_degrees()
}
