//! Episode termination and truncation.

use crate::config::Config;
use crate::vehicle::Vehicle;
use serde::Serialize;

/// Whether an episode has ended, and why.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EpisodeStatus {
    /// The episode reached an unrecoverable outcome.
    pub terminated: bool,
    /// The episode ran out of time.
    pub truncated: bool,
}

impl EpisodeStatus {
    /// Evaluates both end conditions for the agent's vehicle.
    pub fn evaluate(vehicle: &Vehicle, elapsed: f64, config: &Config) -> Self {
        Self {
            terminated: is_terminated(vehicle, config),
            truncated: is_truncated(elapsed, config),
        }
    }

    /// Whether no further steps may be taken.
    pub fn is_over(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// The episode is over if the agent crashed, or left the road when that is terminal.
pub fn is_terminated(vehicle: &Vehicle, config: &Config) -> bool {
    vehicle.crashed() || (config.offroad_terminal && !vehicle.on_road())
}

/// The episode is truncated once `elapsed` seconds reach the configured duration.
pub fn is_truncated(elapsed: f64, config: &Config) -> bool {
    elapsed >= config.duration
}
