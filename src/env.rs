use crate::config::Config;
use crate::lifecycle::EpisodeStatus;
use crate::reward::{self, RewardBreakdown};
use crate::vehicle::control::MetaAction;
use crate::world::{self, World};
use crate::{Error, VehicleId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// The accident scenario, as an episodic environment.
pub struct AccidentEnv {
    /// The scenario options. Reward weights are read from here on every step.
    config: Config,
    /// The episode's random source.
    rng: StdRng,
    /// The current episode, if one has been started.
    world: Option<World>,
    /// Exposes the vehicle the agent's actions are applied to.
    action_type: ActionInterface,
    /// The simulated time since the episode started, in s.
    time: f64,
    /// The number of steps taken this episode.
    steps: usize,
    /// Whether the episode has ended.
    status: EpisodeStatus,
}

/// The interface through which actions reach a vehicle.
#[derive(Clone, Copy, Debug, Default)]
pub struct ActionInterface {
    controlled: Option<VehicleId>,
}

impl ActionInterface {
    /// The vehicle under control, if an episode is running.
    pub fn vehicle(&self) -> Option<VehicleId> {
        self.controlled
    }

    /// Binds the interface to a vehicle.
    fn bind(&mut self, vehicle: VehicleId) {
        self.controlled = Some(vehicle);
    }
}

/// The outcome of a single step.
#[derive(Clone, Debug, Serialize)]
pub struct Step {
    /// The scalar reward.
    pub reward: f64,
    /// The episode reached an unrecoverable outcome.
    pub terminated: bool,
    /// The episode ran out of time.
    pub truncated: bool,
    /// Diagnostic information.
    pub info: StepInfo,
}

impl Step {
    /// Whether the episode is over.
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Diagnostic information about a step.
#[derive(Clone, Debug, Serialize)]
pub struct StepInfo {
    /// The agent's speed in m/s.
    pub speed: f64,
    /// Whether the agent has crashed.
    pub crashed: bool,
    /// The action that was taken.
    pub action: MetaAction,
    /// The unweighted sub-rewards.
    pub rewards: RewardBreakdown,
}

impl AccidentEnv {
    /// Creates an environment with a random source seeded from the operating system.
    pub fn new(config: Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates an environment whose episodes are reproducible.
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            world: None,
            action_type: ActionInterface::default(),
            time: 0.0,
            steps: 0,
            status: EpisodeStatus::default(),
        }
    }

    /// Gets the scenario options.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets the scenario options for editing.
    /// Reward weights take effect from the next step; everything else from the next reset.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Starts a new episode, discarding the current one.
    ///
    /// # Parameters
    /// * `seed` - Reseeds the random source before building the world
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(), Error> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.world = None;
        let world = world::build(&self.config, &mut self.rng)?;
        self.action_type.bind(world.agent_vehicle);
        self.world = Some(world);
        self.time = 0.0;
        self.steps = 0;
        self.status = EpisodeStatus::default();
        Ok(())
    }

    /// Applies an action, advances the simulation by one policy period,
    /// and evaluates the reward and end conditions.
    pub fn step(&mut self, action: MetaAction) -> Result<Step, Error> {
        let world = self.world.as_mut().ok_or(Error::NotReset)?;
        let controlled = self.action_type.vehicle().ok_or(Error::NotReset)?;
        if self.status.is_over() {
            return Err(Error::EpisodeOver);
        }

        let dt = self.config.simulation_dt();
        for frame in 0..self.config.frames_per_action() {
            if frame == 0 {
                world.road.act_on(controlled, action);
            }
            world.road.act();
            world.road.step(dt);
        }
        self.steps += 1;
        self.time = self.config.elapsed(self.steps);

        let (reward, rewards) = reward::compute(
            &world.road,
            world.agent_vehicle,
            controlled,
            world.crash_lane_index,
            &self.config,
            action,
        );
        let vehicle = world.road.vehicle(controlled);
        self.status = EpisodeStatus::evaluate(vehicle, self.time, &self.config);
        if self.status.is_over() {
            log::info!(
                "Episode over after {} steps ({:.1} s): {:?}",
                self.steps,
                self.time,
                self.status
            );
        }

        Ok(Step {
            reward,
            terminated: self.status.terminated,
            truncated: self.status.truncated,
            info: StepInfo {
                speed: vehicle.speed(),
                crashed: vehicle.crashed(),
                action,
                rewards,
            },
        })
    }

    /// Gets the current episode, if one has been started.
    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    /// Gets the current episode for editing, e.g. to stage a test scenario.
    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.world.as_mut()
    }

    /// The vehicle the agent's actions are applied to.
    pub fn vehicle(&self) -> Option<VehicleId> {
        self.action_type.vehicle()
    }

    /// The vehicle recorded as the agent's when the world was built.
    pub fn agent_vehicle(&self) -> Option<VehicleId> {
        self.world.as_ref().map(|w| w.agent_vehicle)
    }

    /// The simulated time since the episode started, in s.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Whether the episode has ended.
    pub fn status(&self) -> EpisodeStatus {
        self.status
    }
}
