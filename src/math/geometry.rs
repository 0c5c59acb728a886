use nalgebra::{Point3, Vector3};

use std::f64::consts::FRAC_PI_2;

/// Unsigned angle a direction makes with the +x axis. This is the "heading"
/// the motion tracer compares between frames. A zero vector has no direction,
/// and is treated as perpendicular to everything.
pub fn heading(v: &Vector3<f64>) -> f64 {
    if v.norm_squared() == 0.0 {
        FRAC_PI_2
    } else {
        v.angle(&Vector3::x())
    }
}

/// Returns the point `length` away from `start`, in the direction of `target`.
/// If `target` coincides with `start`, there is no direction to go in, and
/// `start` is returned.
pub fn extend_towards(start: &Point3<f64>, target: &Point3<f64>, length: f64) -> Point3<f64> {
    match (target - start).try_normalize(0.0) {
        Some(direction) => start + direction * length,
        None => *start,
    }
}

/// Whether `point`, seen from `origin`, lies at least a quarter turn away from
/// `direction`.
pub fn is_at_least_quarter_turn(
    origin: &Point3<f64>,
    point: &Point3<f64>,
    direction: &Vector3<f64>,
) -> bool {
    // angle >= pi/2 is the same as a non-positive dot product. Degenerate
    // vectors count as perpendicular, which falls out of the dot product too.
    let offset = point - origin;
    offset.dot(direction) <= 0.0
}
