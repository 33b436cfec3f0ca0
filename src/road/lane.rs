use crate::math::{project_local, rot90, Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;
use serde::Serialize;
use std::fmt;

/// The default width of a lane in m.
pub const DEFAULT_WIDTH: f64 = 4.0;

/// The length of a vehicle in m, used to pad the ends of a lane.
const VEHICLE_LENGTH: f64 = 5.0;

/// Identifies a lane by the nodes it runs between and its position
/// among the parallel lanes of that road segment, counted from the left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct LaneIndex {
    pub from: &'static str,
    pub to: &'static str,
    pub id: usize,
}

impl LaneIndex {
    pub const fn new(from: &'static str, to: &'static str, id: usize) -> Self {
        Self { from, to, id }
    }

    /// The lane with the same endpoints but a different position.
    pub fn with_id(self, id: usize) -> Self {
        Self { id, ..self }
    }
}

impl fmt::Display for LaneIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.from, self.to, self.id)
    }
}

/// A single straight lane of traffic.
#[derive(Clone, Debug)]
pub struct StraightLane {
    /// The lane's identifier.
    index: LaneIndex,
    /// The world space coordinates of the start of the centre line.
    start: Point2d,
    /// The length of the lane in m.
    length: f64,
    /// A unit vector pointing along the lane.
    direction: Vector2d,
    /// The lane width in m.
    width: f64,
    /// Speed limit in m/s.
    speed_limit: f64,
}

impl StraightLane {
    /// Creates a new lane running from `start` to `end`.
    pub fn new(index: LaneIndex, start: Point2d, end: Point2d, width: f64, speed_limit: f64) -> Self {
        let delta = end - start;
        Self {
            index,
            start,
            length: delta.magnitude(),
            direction: delta.normalize(),
            width,
            speed_limit,
        }
    }

    /// Gets the lane's identifier.
    pub fn index(&self) -> LaneIndex {
        self.index
    }

    /// Gets the length of the lane in m.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Gets the width of the lane in m.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Gets the speed limit of the lane in m/s.
    pub fn speed_limit(&self) -> f64 {
        self.speed_limit
    }

    /// Converts lane coordinates into world coordinates.
    ///
    /// # Parameters
    /// * `longitudinal` - The distance along the centre line from the start of the lane
    /// * `lateral` - The offset from the centre line, positive towards the right-hand lanes
    pub fn position(&self, longitudinal: f64, lateral: f64) -> Point2d {
        self.start + longitudinal * self.direction + lateral * rot90(self.direction)
    }

    /// The heading of the lane in radians at the given longitudinal position.
    pub fn heading_at(&self, _longitudinal: f64) -> f64 {
        self.direction.y.atan2(self.direction.x)
    }

    /// Converts world coordinates into `(longitudinal, lateral)` lane coordinates.
    pub fn local_coordinates(&self, point: Point2d) -> (f64, f64) {
        let local = project_local(point, self.start, self.direction, rot90(self.direction));
        (local.x, local.y)
    }

    /// Whether a point lies on the lane, allowing `margin` of extra lateral slack.
    pub fn on_lane(&self, point: Point2d, margin: f64) -> bool {
        let (long, lat) = self.local_coordinates(point);
        let extent = Interval::new(-VEHICLE_LENGTH, self.length + VEHICLE_LENGTH);
        lat.abs() <= 0.5 * self.width + margin && extent.contains(long)
    }

    /// A distance from the point to the lane, used to find the closest lane.
    pub fn distance(&self, point: Point2d) -> f64 {
        let (long, lat) = self.local_coordinates(point);
        lat.abs() + f64::max(long - self.length, 0.0) + f64::max(-long, 0.0)
    }
}
