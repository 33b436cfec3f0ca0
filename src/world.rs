//! Construction of an episode's initial world state.

use crate::config::Config;
use crate::road::{Road, RoadNetwork};
use crate::vehicle::VehicleKind;
use crate::{Error, VehicleId};
use rand::Rng;

pub use hazard::place_hazards;

mod hazard;

/// The number of lanes on the road.
pub const LANES_COUNT: usize = 4;

/// The length of the road in m.
pub const ROAD_LENGTH: f64 = 1000.0;

/// The initial speed of the ego vehicle in m/s.
const EGO_SPEED: f64 = 25.0;

/// The state of one episode.
#[derive(Clone, Debug)]
pub struct World {
    /// The road and everything on it.
    pub road: Road,
    /// The lane containing the accident.
    pub crash_lane_index: usize,
    /// The vehicle driven by the agent.
    pub agent_vehicle: VehicleId,
}

/// Builds a straight road with an accident part way along, and fills it with traffic.
///
/// All randomness is drawn from `rng`, so a seeded source gives a reproducible world.
pub fn build(config: &Config, rng: &mut impl Rng) -> Result<World, Error> {
    let network = RoadNetwork::straight_road_network(LANES_COUNT, ROAD_LENGTH, config.speed_limit);
    let mut road = Road::new(network);

    let crash_lane_index = place_hazards(&mut road, rng)?;
    log::debug!("Accident placed in lane {}", crash_lane_index);

    let agent_vehicle = add_ego(&mut road, config, rng)?;
    add_traffic(&mut road, config, rng)?;

    Ok(World {
        road,
        crash_lane_index,
        agent_vehicle,
    })
}

/// Adds the agent's vehicle to the road.
fn add_ego(road: &mut Road, config: &Config, rng: &mut impl Rng) -> Result<VehicleId, Error> {
    let vehicle = road
        .spawn_random(rng, Some(EGO_SPEED), config.initial_lane_id, config.ego_spacing)?
        .into_controlled();
    log::debug!(
        "Ego vehicle placed at {:?} in lane {}",
        vehicle.position(),
        vehicle.lane_index()
    );
    Ok(road.add_vehicle(vehicle))
}

/// Adds the background traffic, each vehicle with a randomised driver.
fn add_traffic(road: &mut Road, config: &Config, rng: &mut impl Rng) -> Result<(), Error> {
    let spacing = 1.0 / config.vehicles_density;
    for _ in 0..config.vehicles_count {
        let mut vehicle = road.spawn_random(rng, None, None, spacing)?;
        if let VehicleKind::Background(driver) = vehicle.kind_mut() {
            driver.randomize(rng);
        }
        road.add_vehicle(vehicle);
    }
    Ok(())
}
