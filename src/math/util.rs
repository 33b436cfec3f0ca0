use super::{Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;
use std::f64::consts::PI;

/// Smallest magnitude `not_zero` will let through.
const EPSILON: f64 = 1e-2;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees, from the direction of travel towards the right-hand lanes.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// A unit vector pointing along the given heading in radians.
pub fn heading_vector(heading: f64) -> Vector2d {
    Vector2d::new(heading.cos(), heading.sin())
}

/// Linearly maps `value` from the interval `from` onto the interval `to`.
/// The result is not clamped.
pub fn lmap(value: f64, from: Interval<f64>, to: Interval<f64>) -> f64 {
    to.lerp(from.inv_lerp(value))
}

/// Wraps an angle to the range `[-PI, PI)`.
pub fn wrap_to_pi(angle: f64) -> f64 {
    (angle + PI).rem_euclid(2.0 * PI) - PI
}

/// Pushes `x` away from zero so it can safely be used as a divisor.
pub fn not_zero(x: f64) -> f64 {
    if x.abs() > EPSILON {
        x
    } else if x >= 0.0 {
        EPSILON
    } else {
        -EPSILON
    }
}
