use crate::road::Road;
use crate::vehicle::Vehicle;
use crate::Error;
use rand::Rng;
use std::f64::consts::FRAC_PI_4;

/// Where the crashed vehicles sit, as (longitudinal, lateral, heading)
/// relative to the crash lane. The first entry is the reference hazard.
const HAZARDS: [(f64, f64, f64); 2] = [(500.0, -2.0, FRAC_PI_4), (505.0, 0.0, -FRAC_PI_4)];

/// Chooses a crash lane at random from the lanes right of the leftmost one,
/// and places the crashed vehicles in it.
/// Returns the index of the crash lane.
pub fn place_hazards(road: &mut Road, rng: &mut impl Rng) -> Result<usize, Error> {
    let crash_lane_index = rng.gen_range(1..road.network().lanes_count());
    let hazards = {
        let network = road.network();
        let lane = network.lane_by_id(crash_lane_index)?;
        HAZARDS.map(|(long, lat, heading)| Vehicle::hazard(network, lane.position(long, lat), heading))
    };
    for hazard in hazards {
        road.add_object(hazard);
    }
    Ok(crash_lane_index)
}
