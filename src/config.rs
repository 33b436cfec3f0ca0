//! Scenario configuration.

use crate::util::Interval;
use crate::Error;
use serde::{Deserialize, Serialize};

/// The options of the accident scenario.
///
/// Every field has a default; when deserialising, missing keys take their
/// default values and unknown keys are rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The speed limit of every lane, in m/s.
    pub speed_limit: f64,
    /// The number of background vehicles.
    pub vehicles_count: usize,
    /// The number of agent controlled vehicles. Only one is ever created.
    pub controlled_vehicles: usize,
    /// Forces the ego vehicle to start in this lane.
    pub initial_lane_id: Option<usize>,
    /// The length of an episode, in s.
    pub duration: f64,
    /// Scales the gap ahead of the ego vehicle when it is placed.
    pub ego_spacing: f64,
    /// The inverse of the spacing factor used to place background vehicles.
    pub vehicles_density: f64,
    /// Weight of the collision sub-reward.
    pub collision_reward: f64,
    /// Weight of the right lane sub-reward.
    pub right_lane_reward: f64,
    /// Weight of the high speed sub-reward.
    pub high_speed_reward: f64,
    /// Weight of the lane change sub-reward.
    pub lane_change_reward: f64,
    /// Weight of the penalty for approaching the accident in its lane.
    pub reaction_reward: f64,
    /// Weight of the penalty for following too closely.
    pub tailgating_reward: f64,
    /// Weight of the bonus for passing the accident in the rightmost lane.
    pub job_well_done_reward: f64,
    /// The forward speeds mapped to a high speed reward of 0 and 1, in m/s.
    pub reward_speed_range: Interval<f64>,
    /// Whether to map the weighted reward onto `[0, 1]`.
    pub normalize_reward: bool,
    /// Whether leaving the road ends the episode.
    pub offroad_terminal: bool,
    /// Physics steps per second.
    pub simulation_frequency: u32,
    /// Agent decisions per second.
    pub policy_frequency: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speed_limit: 30.0,
            vehicles_count: 10,
            controlled_vehicles: 1,
            initial_lane_id: None,
            duration: 20.0,
            ego_spacing: 2.0,
            vehicles_density: 1.0,
            collision_reward: -1.0,
            right_lane_reward: 0.1,
            high_speed_reward: 0.4,
            lane_change_reward: 0.0,
            reaction_reward: 0.0,
            tailgating_reward: 0.0,
            job_well_done_reward: 0.0,
            reward_speed_range: Interval::new(10.0, 30.0),
            normalize_reward: true,
            offroad_terminal: false,
            simulation_frequency: 15,
            policy_frequency: 1,
        }
    }
}

impl Config {
    /// Parses a JSON object of overrides, filling in every missing key with its default.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Merges a JSON object of overrides into a copy of this configuration.
    pub fn with_overrides(&self, overrides: serde_json::Value) -> Result<Self, Error> {
        let mut merged = serde_json::to_value(self)?;
        if let (Some(merged), serde_json::Value::Object(overrides)) =
            (merged.as_object_mut(), overrides)
        {
            merged.extend(overrides);
        }
        Ok(serde_json::from_value(merged)?)
    }

    /// The weight of the named sub-reward, or 0 if there is no such weight.
    pub fn reward_weight(&self, name: &str) -> f64 {
        match name {
            "collision_reward" => self.collision_reward,
            "right_lane_reward" => self.right_lane_reward,
            "high_speed_reward" => self.high_speed_reward,
            "lane_change_reward" => self.lane_change_reward,
            "reaction_reward" => self.reaction_reward,
            "tailgating_reward" => self.tailgating_reward,
            "job_well_done_reward" => self.job_well_done_reward,
            _ => 0.0,
        }
    }

    /// The length of one physics step, in s.
    pub fn simulation_dt(&self) -> f64 {
        1.0 / self.simulation_frequency as f64
    }

    /// The time that passes between agent decisions, in s.
    pub fn policy_dt(&self) -> f64 {
        1.0 / self.policy_frequency as f64
    }

    /// The simulated time after `steps` agent decisions, in s.
    pub fn elapsed(&self, steps: usize) -> f64 {
        steps as f64 / self.policy_frequency as f64
    }

    /// The number of physics steps per agent decision.
    pub fn frames_per_action(&self) -> u32 {
        u32::max(self.simulation_frequency / self.policy_frequency, 1)
    }
}
