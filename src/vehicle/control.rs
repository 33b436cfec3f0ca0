use super::dynamics::{Control, KinematicState};
use crate::math::{not_zero, wrap_to_pi};
use crate::road::{LaneIndex, RoadNetwork, StraightLane};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_3, FRAC_PI_4};
use std::fmt;

/// Time constant of the speed controller, in s.
const TAU_ACC: f64 = 0.6;

/// Time constant of the heading controller, in s.
const TAU_HEADING: f64 = 0.2;

/// Time constant of the lateral position controller, in s.
const TAU_LATERAL: f64 = 0.6;

/// How far ahead the heading controller looks, in s.
const TAU_PURSUIT: f64 = 0.5 * TAU_HEADING;

/// The maximum front wheel angle in radians.
const MAX_STEERING_ANGLE: f64 = FRAC_PI_3;

/// The speeds a controlled vehicle may be asked to hold, in m/s.
pub const TARGET_SPEEDS: [f64; 3] = [20.0, 25.0, 30.0];

/// A high level driving decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetaAction {
    LaneLeft,
    Idle,
    LaneRight,
    Faster,
    Slower,
}

impl MetaAction {
    /// All the actions, in their conventional order.
    pub const ALL: [MetaAction; 5] = [
        MetaAction::LaneLeft,
        MetaAction::Idle,
        MetaAction::LaneRight,
        MetaAction::Faster,
        MetaAction::Slower,
    ];

    /// Decodes an action from its position in [MetaAction::ALL].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for MetaAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetaAction::LaneLeft => "LANE_LEFT",
            MetaAction::Idle => "IDLE",
            MetaAction::LaneRight => "LANE_RIGHT",
            MetaAction::Faster => "FASTER",
            MetaAction::Slower => "SLOWER",
        };
        f.write_str(name)
    }
}

/// Tracks a target lane and target speed on behalf of the agent.
#[derive(Clone, Debug)]
pub struct Controller {
    target_lane_index: LaneIndex,
    speed_index: usize,
}

impl Controller {
    /// Creates a controller which holds the given lane, at the
    /// target speed closest to `speed`.
    pub fn new(lane_index: LaneIndex, speed: f64) -> Self {
        let speed_index = (0..TARGET_SPEEDS.len())
            .min_by(|a, b| {
                let da = (TARGET_SPEEDS[*a] - speed).abs();
                let db = (TARGET_SPEEDS[*b] - speed).abs();
                da.total_cmp(&db)
            })
            .unwrap_or(0);
        Self {
            target_lane_index: lane_index,
            speed_index,
        }
    }

    /// The lane the vehicle is steering towards.
    pub fn target_lane_index(&self) -> LaneIndex {
        self.target_lane_index
    }

    /// The speed the vehicle is accelerating towards, in m/s.
    pub fn target_speed(&self) -> f64 {
        TARGET_SPEEDS[self.speed_index]
    }

    /// Computes the control inputs for the vehicle this controller drives.
    pub(crate) fn control(
        &self,
        state: KinematicState,
        half_length: f64,
        network: &RoadNetwork,
    ) -> Control {
        let steering = network
            .get_lane(self.target_lane_index)
            .map(|lane| steering_control(state, half_length, lane))
            .unwrap_or(0.0);
        Control {
            acceleration: speed_control(state.speed, self.target_speed()),
            steering,
        }
    }

    /// Updates the targets according to a high level action.
    /// Lane changes past the edge of the road are ignored.
    pub fn act(&mut self, action: MetaAction, network: &RoadNetwork) {
        let lane_id = self.target_lane_index.id;
        let max_lane = network.lanes_count().saturating_sub(1);
        match action {
            MetaAction::LaneLeft => {
                let target = self.target_lane_index.with_id(lane_id.saturating_sub(1));
                self.target_lane_index = target;
            }
            MetaAction::LaneRight => {
                let target = self.target_lane_index.with_id(usize::min(lane_id + 1, max_lane));
                self.target_lane_index = target;
            }
            MetaAction::Faster => {
                self.speed_index = usize::min(self.speed_index + 1, TARGET_SPEEDS.len() - 1);
            }
            MetaAction::Slower => {
                self.speed_index = self.speed_index.saturating_sub(1);
            }
            MetaAction::Idle => {}
        }
    }
}

/// Computes the front wheel angle which steers a vehicle onto the centre line of `lane`.
///
/// # Parameters
/// * `state` - The vehicle's position, heading and speed
/// * `half_length` - Half the vehicle's length in m
/// * `lane` - The lane to follow
pub fn steering_control(
    state: KinematicState,
    half_length: f64,
    lane: &StraightLane,
) -> f64 {
    let (long, lat) = lane.local_coordinates(state.position);
    let future_heading = lane.heading_at(long + state.speed * TAU_PURSUIT);

    // Lateral position loop
    let lateral_speed_command = -lat / TAU_LATERAL;
    let heading_command = (lateral_speed_command / not_zero(state.speed))
        .clamp(-1.0, 1.0)
        .asin();
    let heading_ref = future_heading + heading_command.clamp(-FRAC_PI_4, FRAC_PI_4);

    // Heading loop
    let heading_rate_command = wrap_to_pi(heading_ref - state.heading) / TAU_HEADING;
    let slip_angle = (half_length / not_zero(state.speed) * heading_rate_command)
        .clamp(-1.0, 1.0)
        .asin();
    let steering = (2.0 * slip_angle.tan()).atan();
    steering.clamp(-MAX_STEERING_ANGLE, MAX_STEERING_ANGLE)
}

/// Computes the acceleration which brings a vehicle to `target_speed`.
pub fn speed_control(speed: f64, target_speed: f64) -> f64 {
    (target_speed - speed) / TAU_ACC
}
