pub use cgmath;
pub use config::Config;
pub use env::{AccidentEnv, ActionInterface, Step, StepInfo};
pub use lifecycle::EpisodeStatus;
pub use reward::RewardBreakdown;
pub use road::{LaneIndex, Road, RoadNetwork, StraightLane};
use slotmap::{new_key_type, SlotMap};
pub use slotmap::{Key, KeyData};
pub use util::Interval;
pub use vehicle::control::MetaAction;
pub use vehicle::{Vehicle, VehicleKind};
pub use world::World;

pub mod config;
mod env;
pub mod lifecycle;
pub mod math;
pub mod reward;
pub mod road;
mod util;
pub mod vehicle;
pub mod world;

new_key_type! {
    /// Unique ID of a [Vehicle].
    pub struct VehicleId;
}

type VehicleSet = SlotMap<VehicleId, Vehicle>;

/// The ways building or stepping an episode can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A lane index that does not name a lane of the road.
    #[error("no lane {0} in the road network")]
    UnknownLane(LaneIndex),
    /// Configuration that could not be parsed, or that has unknown keys.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
    /// A step was requested before the first reset.
    #[error("the environment must be reset before it is stepped")]
    NotReset,
    /// A step was requested after the episode ended.
    #[error("the episode is over; reset to start a new one")]
    EpisodeOver,
}
