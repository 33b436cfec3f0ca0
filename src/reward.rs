//! Reward shaping for the accident scenario.

use crate::config::Config;
use crate::math::lmap;
use crate::road::Road;
use crate::util::Interval;
use crate::vehicle::control::MetaAction;
use crate::VehicleId;
use serde::Serialize;

/// Distance from the accident inside which approaching it is penalised, in m.
const REACTION_DISTANCE: f64 = 40.0;

/// Distance over which the reaction penalty grows by one, in m.
const REACTION_SCALE: f64 = 80.0;

/// Distance to the vehicle ahead inside which following is penalised, in m.
const TAILGATING_DISTANCE: f64 = 10.0;

/// Distance over which the tailgating penalty grows by one, in m.
const TAILGATING_SCALE: f64 = 20.0;

/// How far along the road the agent must be to have cleared the accident, in m.
const CLEARANCE_POSITION: f64 = 510.0;

/// The bonus for clearing the accident in the rightmost lane.
const CLEARANCE_BONUS: f64 = 0.3;

/// The unweighted sub-rewards of a single step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RewardBreakdown {
    /// 1 if the agent has crashed.
    pub collision_reward: f64,
    /// How far right the agent is driving, from 0 (leftmost) to 1 (rightmost).
    pub right_lane_reward: f64,
    /// The agent's forward speed mapped onto `[0, 1]`.
    pub high_speed_reward: f64,
    /// 1 if the agent is on the road.
    pub on_road_reward: f64,
    /// Non-positive penalty for closing in on the accident in an affected lane.
    pub reaction_reward: f64,
    /// Non-positive penalty for following the vehicle ahead too closely.
    pub tailgating_reward: f64,
    /// A bonus for having passed the accident in the rightmost lane.
    pub job_well_done_reward: f64,
}

impl RewardBreakdown {
    /// The sub-rewards by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("collision_reward", self.collision_reward),
            ("right_lane_reward", self.right_lane_reward),
            ("high_speed_reward", self.high_speed_reward),
            ("on_road_reward", self.on_road_reward),
            ("reaction_reward", self.reaction_reward),
            ("tailgating_reward", self.tailgating_reward),
            ("job_well_done_reward", self.job_well_done_reward),
        ]
        .into_iter()
    }
}

/// Computes the reward for the step that has just been simulated.
///
/// # Parameters
/// * `road` - The road after the step
/// * `agent` - The vehicle recorded as the agent's when the world was built
/// * `controlled` - The vehicle under the action interface; the same vehicle as `agent`
/// * `crash_lane_index` - The lane containing the accident
/// * `config` - Supplies the weights, which are read afresh on every call
/// * `action` - The action that was just taken
///
/// # Returns
/// The scalar reward, and the unweighted sub-rewards it was built from.
pub fn compute(
    road: &Road,
    agent: VehicleId,
    controlled: VehicleId,
    crash_lane_index: usize,
    config: &Config,
    action: MetaAction,
) -> (f64, RewardBreakdown) {
    let rewards = rewards(road, agent, controlled, crash_lane_index, config);
    let reward = combine(&rewards, config);
    log::trace!("{} -> reward {:.3} from {:?}", action, reward, rewards);
    (reward, rewards)
}

/// Weights, optionally normalises, and masks the sub-rewards.
pub fn combine(rewards: &RewardBreakdown, config: &Config) -> f64 {
    let mut reward = rewards
        .iter()
        .filter(|(name, _)| *name != "on_road_reward")
        .map(|(name, value)| config.reward_weight(name) * value)
        .sum::<f64>();
    if config.normalize_reward {
        let bounds = Interval::new(
            config.collision_reward,
            config.high_speed_reward + config.right_lane_reward,
        );
        reward = lmap(reward, bounds, Interval::new(0.0, 1.0));
    }
    reward * rewards.on_road_reward
}

/// Evaluates each of the sub-rewards.
pub fn rewards(
    road: &Road,
    agent: VehicleId,
    controlled: VehicleId,
    crash_lane_index: usize,
    config: &Config,
) -> RewardBreakdown {
    let network = road.network();
    let vehicle = road.vehicle(controlled);
    let agent_vehicle = road.vehicle(agent);

    let neighbours = network.all_side_lanes(vehicle.lane_index()).len();
    let lane = vehicle.target_lane_index().id as f64;
    let scaled_speed = lmap(
        vehicle.forward_speed(),
        config.reward_speed_range,
        Interval::new(0.0, 1.0),
    );

    // Penalty for closing in on the accident from its lane, or the lane it spills into
    let agent_lane = agent_vehicle.lane_index().id;
    let reaction_reward = match road.objects().first() {
        Some(hazard) if agent_lane == crash_lane_index || agent_lane + 1 == crash_lane_index => {
            let distance = agent_vehicle.distance_to(hazard);
            f64::min(0.0, (distance - REACTION_DISTANCE) / REACTION_SCALE)
        }
        _ => 0.0,
    };

    // Penalty for tailgating
    let (front, _) = road.neighbour_vehicles(agent, agent_vehicle.lane_index());
    let tailgating_reward = match front {
        Some(front) => {
            let distance = agent_vehicle.distance_to(front);
            f64::min(0.0, (distance - TAILGATING_DISTANCE) / TAILGATING_SCALE)
        }
        None => 0.0,
    };

    // Bonus for having passed the accident in the rightmost lane
    let rightmost = network.lanes_count().saturating_sub(1);
    let job_well_done_reward =
        if agent_lane == rightmost && agent_vehicle.position().x > CLEARANCE_POSITION {
            CLEARANCE_BONUS
        } else {
            0.0
        };

    RewardBreakdown {
        collision_reward: if vehicle.crashed() { 1.0 } else { 0.0 },
        right_lane_reward: lane / usize::max(neighbours.saturating_sub(1), 1) as f64,
        high_speed_reward: scaled_speed.clamp(0.0, 1.0),
        on_road_reward: if vehicle.on_road() { 1.0 } else { 0.0 },
        reaction_reward,
        tailgating_reward,
        job_well_done_reward,
    }
}
