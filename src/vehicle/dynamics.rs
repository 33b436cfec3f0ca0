use crate::math::{heading_vector, rot90, Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;

/// The maximum forward speed of any vehicle in m/s.
const MAX_SPEED: f64 = 40.0;

/// The maximum reverse speed of any vehicle in m/s.
const MIN_SPEED: f64 = -40.0;

/// The control inputs applied to a vehicle over one integration step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Control {
    /// Longitudinal acceleration in m/s^2.
    pub acceleration: f64,
    /// Front wheel angle in radians.
    pub steering: f64,
}

/// The kinematic state of a vehicle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KinematicState {
    pub position: Point2d,
    pub heading: f64,
    pub speed: f64,
}

/// Integrates a kinematic bicycle model, with the centre of gravity
/// half way along the wheel base.
///
/// # Parameters
/// * `state` - The current state
/// * `control` - The control inputs, held constant over the step
/// * `half_length` - Distance from the centre of the vehicle to the rear axle, in m
/// * `dt` - The time step in seconds
pub fn integrate(state: KinematicState, control: Control, half_length: f64, dt: f64) -> KinematicState {
    let beta = (0.5 * control.steering.tan()).atan();
    let velocity = state.speed * heading_vector(state.heading + beta);
    let position = state.position + velocity * dt;
    let heading = state.heading + state.speed * beta.sin() / half_length * dt;
    let speed = (state.speed + control.acceleration * dt).clamp(MIN_SPEED, MAX_SPEED);
    KinematicState {
        position,
        heading,
        speed,
    }
}

/// The control applied to a crashed vehicle: no steering, braking to a halt.
pub fn crashed_control(speed: f64) -> Control {
    Control {
        acceleration: -speed,
        steering: 0.0,
    }
}

/// The four corners of a vehicle's footprint.
pub fn corners(position: Point2d, heading: f64, length: f64, width: f64) -> [Point2d; 4] {
    let long = 0.5 * length * heading_vector(heading);
    let lat = 0.5 * width * rot90(heading_vector(heading));
    [
        position + long + lat,
        position + long - lat,
        position - long - lat,
        position - long + lat,
    ]
}

/// Determines whether two convex quadrilaterals overlap, using the separating axis theorem.
pub fn boxes_intersect(a: &[Point2d; 4], b: &[Point2d; 4]) -> bool {
    let axes = [a[1] - a[0], a[2] - a[1], b[1] - b[0], b[2] - b[1]];
    axes.iter().all(|axis| {
        let axis = axis.normalize();
        project(a, axis).overlaps(&project(b, axis))
    })
}

/// Projects the corners of a box onto an axis.
fn project(corners: &[Point2d; 4], axis: Vector2d) -> Interval<f64> {
    corners.iter().map(|c| c.to_vec().dot(axis)).fold(
        Interval::new(f64::INFINITY, f64::NEG_INFINITY),
        |acc, x| Interval::new(acc.min.min(x), acc.max.max(x)),
    )
}
