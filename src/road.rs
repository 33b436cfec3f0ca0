use crate::math::Point2d;
use crate::vehicle::behavior::DriverModel;
use crate::vehicle::control::{steering_control, MetaAction};
use crate::vehicle::dynamics::{boxes_intersect, Control};
use crate::vehicle::{Vehicle, VehicleKind};
use crate::{Error, VehicleId, VehicleSet};
use rand::Rng;

pub use lane::{LaneIndex, StraightLane, DEFAULT_WIDTH};
pub use network::RoadNetwork;

mod lane;
mod network;

/// The lateral slack allowed when deciding whether a vehicle is in a lane.
const NEIGHBOUR_LANE_MARGIN: f64 = 1.0;

/// The road: its lanes, the vehicles driving on it, and the static objects on it.
#[derive(Clone, Debug)]
pub struct Road {
    /// The lanes of the road.
    network: RoadNetwork,
    /// The vehicles being simulated.
    vehicles: VehicleSet,
    /// The vehicles, in the order they were added.
    order: Vec<VehicleId>,
    /// The static objects, such as crashed vehicles.
    objects: Vec<Vehicle>,
}

impl Road {
    /// Creates an empty road over the given network.
    pub fn new(network: RoadNetwork) -> Self {
        Self {
            network,
            vehicles: VehicleSet::with_key(),
            order: vec![],
            objects: vec![],
        }
    }

    /// Gets the road's lanes.
    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    /// Adds a vehicle to the road.
    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> VehicleId {
        let id = self.vehicles.insert(vehicle);
        self.order.push(id);
        id
    }

    /// Adds a static object to the road.
    pub fn add_object(&mut self, object: Vehicle) {
        self.objects.push(object);
    }

    /// Gets a reference to the vehicle with the given ID.
    pub fn vehicle(&self, id: VehicleId) -> &Vehicle {
        &self.vehicles[id]
    }

    /// Gets a mutable reference to the vehicle with the given ID.
    pub fn vehicle_mut(&mut self, id: VehicleId) -> &mut Vehicle {
        &mut self.vehicles[id]
    }

    /// Returns an iterator over all the vehicles, in the order they were added.
    pub fn iter_vehicles(&self) -> impl Iterator<Item = (VehicleId, &Vehicle)> {
        self.order.iter().map(move |id| (*id, &self.vehicles[*id]))
    }

    /// The static objects on the road, in the order they were added.
    pub fn objects(&self) -> &[Vehicle] {
        &self.objects
    }

    /// Creates a background vehicle at a random position behind the
    /// front of the existing traffic. The vehicle is not added to the road.
    ///
    /// # Parameters
    /// * `rng` - The episode's random source
    /// * `speed` - The initial speed, or random if `None`
    /// * `lane_id` - The lane to place the vehicle in, or random if `None`
    /// * `spacing` - A scale factor on the gap left to the vehicle ahead
    pub fn spawn_random(
        &self,
        rng: &mut impl Rng,
        speed: Option<f64>,
        lane_id: Option<usize>,
        spacing: f64,
    ) -> Result<Vehicle, Error> {
        let lanes_count = self.network.lanes_count();
        let lane_id = match lane_id {
            Some(id) => id,
            None => rng.gen_range(0..lanes_count),
        };
        let lane = self.network.lane_by_id(lane_id)?;
        let speed = match speed {
            Some(speed) => speed,
            None => rng.gen_range(0.7 * lane.speed_limit()..0.8 * lane.speed_limit()),
        };

        let default_spacing = 12.0 + speed;
        let offset = spacing * default_spacing * (-5.0 / 40.0 * lanes_count as f64).exp();
        let x0 = self
            .iter_vehicles()
            .map(|(_, v)| lane.local_coordinates(v.position()).0)
            .reduce(f64::max)
            .unwrap_or(3.0 * offset);
        let x0 = x0 + offset * rng.gen_range(0.9..1.1);

        Ok(Vehicle::new(
            &self.network,
            lane.position(x0, 0.0),
            lane.heading_at(x0),
            speed,
        ))
    }

    /// Finds the vehicles (or objects) immediately ahead of and behind a vehicle,
    /// among those in the given lane.
    pub fn neighbour_vehicles(
        &self,
        vehicle_id: VehicleId,
        lane_index: LaneIndex,
    ) -> (Option<&Vehicle>, Option<&Vehicle>) {
        let lane = match self.network.get_lane(lane_index) {
            Ok(lane) => lane,
            Err(_) => return (None, None),
        };
        let s = lane.local_coordinates(self.vehicles[vehicle_id].position()).0;

        let others = self
            .iter_vehicles()
            .filter(|(id, _)| *id != vehicle_id)
            .map(|(_, v)| v)
            .chain(self.objects.iter());

        let mut front: Option<(f64, &Vehicle)> = None;
        let mut rear: Option<(f64, &Vehicle)> = None;
        for other in others {
            if !lane.on_lane(other.position(), NEIGHBOUR_LANE_MARGIN) {
                continue;
            }
            let s_other = lane.local_coordinates(other.position()).0;
            if s <= s_other && front.map_or(true, |(s_front, _)| s_other <= s_front) {
                front = Some((s_other, other));
            }
            if s_other < s && rear.map_or(true, |(s_rear, _)| s_other > s_rear) {
                rear = Some((s_other, other));
            }
        }
        (front.map(|f| f.1), rear.map(|r| r.1))
    }

    /// Passes a high level action to a controlled vehicle.
    pub fn act_on(&mut self, vehicle_id: VehicleId, action: MetaAction) {
        let vehicle = &mut self.vehicles[vehicle_id];
        vehicle.act(action, &self.network);
    }

    /// Moves a vehicle to a new position, e.g. to set up a test scenario.
    pub fn move_vehicle(&mut self, vehicle_id: VehicleId, position: Point2d) {
        let vehicle = &mut self.vehicles[vehicle_id];
        vehicle.set_position(position, &self.network);
    }

    /// Decides the control inputs of every vehicle for the next step.
    pub fn act(&mut self) {
        let controls = self
            .order
            .iter()
            .map(|id| (*id, self.control_for(*id)))
            .collect::<Vec<_>>();
        for (id, control) in controls {
            self.vehicles[id].set_control(control);
        }
    }

    /// Advances every vehicle by `dt` seconds, then detects collisions.
    pub fn step(&mut self, dt: f64) {
        for vehicle in self.vehicles.values_mut() {
            vehicle.integrate(dt);
            vehicle.update_lane(&self.network);
        }
        self.handle_collisions();
    }

    /// Computes a vehicle's control inputs.
    fn control_for(&self, vehicle_id: VehicleId) -> Control {
        let vehicle = &self.vehicles[vehicle_id];
        let half_length = 0.5 * vehicle.length();
        match vehicle.kind() {
            VehicleKind::Controlled(ctrl) => ctrl.control(vehicle.state(), half_length, &self.network),
            VehicleKind::Background(driver) => {
                self.follow_lane(vehicle_id, vehicle, driver, half_length)
            }
            VehicleKind::Hazard => Control::default(),
        }
    }

    /// Applies the car following model, keeping the vehicle in its lane.
    fn follow_lane(
        &self,
        vehicle_id: VehicleId,
        vehicle: &Vehicle,
        driver: &DriverModel,
        half_length: f64,
    ) -> Control {
        let (front, _) = self.neighbour_vehicles(vehicle_id, vehicle.lane_index());
        let front = front.map(|f| (self.lane_distance(vehicle, f), f.speed()));
        let steering = self
            .network
            .get_lane(vehicle.lane_index())
            .map(|lane| steering_control(vehicle.state(), half_length, lane))
            .unwrap_or(0.0);
        Control {
            acceleration: driver.acceleration(vehicle.speed(), front),
            steering,
        }
    }

    /// The longitudinal distance from `vehicle` to `other`, along `vehicle`'s lane.
    fn lane_distance(&self, vehicle: &Vehicle, other: &Vehicle) -> f64 {
        match self.network.get_lane(vehicle.lane_index()) {
            Ok(lane) => {
                lane.local_coordinates(other.position()).0 - lane.local_coordinates(vehicle.position()).0
            }
            Err(_) => vehicle.distance_to(other),
        }
    }

    /// Marks every pair of overlapping vehicles, and every vehicle
    /// overlapping an object, as crashed.
    fn handle_collisions(&mut self) {
        let mut crashed = vec![];
        for (i, a) in self.order.iter().enumerate() {
            let corners = self.vehicles[*a].corners();
            for b in &self.order[i + 1..] {
                if boxes_intersect(&corners, &self.vehicles[*b].corners()) {
                    crashed.push(*a);
                    crashed.push(*b);
                }
            }
            if self.objects.iter().any(|o| boxes_intersect(&corners, &o.corners())) {
                crashed.push(*a);
            }
        }
        for id in crashed {
            let vehicle = &mut self.vehicles[id];
            if !vehicle.crashed() {
                log::debug!("Vehicle {:?} crashed at {:?}", id, vehicle.position());
            }
            vehicle.crash();
        }
    }
}
