use self::behavior::DriverModel;
use self::control::{Controller, MetaAction};
use self::dynamics::{crashed_control, integrate, Control, KinematicState};
use crate::math::{heading_vector, Point2d, Vector2d};
use crate::road::{LaneIndex, RoadNetwork};

pub mod behavior;
pub mod control;
pub mod dynamics;

/// The length of every vehicle in m.
pub const VEHICLE_LENGTH: f64 = 5.0;

/// The width of every vehicle in m.
pub const VEHICLE_WIDTH: f64 = 2.0;

/// A simulated vehicle.
#[derive(Clone, Debug)]
pub struct Vehicle {
    /// The world space coordinates of the centre of the vehicle.
    position: Point2d,
    /// The heading in radians, anticlockwise from the +x axis.
    heading: f64,
    /// The speed in m/s.
    speed: f64,
    /// The lane the vehicle is closest to.
    lane_index: LaneIndex,
    /// Whether the vehicle has been in a collision.
    crashed: bool,
    /// Whether the vehicle lies within its lane's bounds.
    on_road: bool,
    /// What drives the vehicle.
    kind: VehicleKind,
    /// The control inputs for the next integration step.
    control: Control,
}

/// What drives a vehicle.
#[derive(Clone, Debug)]
pub enum VehicleKind {
    /// Driven by the agent's actions.
    Controlled(Controller),
    /// Driven by an autonomous car following model.
    Background(DriverModel),
    /// A stopped, crashed vehicle that never moves.
    Hazard,
}

impl Vehicle {
    /// Creates a background vehicle at the given position, which will try to hold `speed`.
    pub fn new(network: &RoadNetwork, position: Point2d, heading: f64, speed: f64) -> Self {
        let lane_index = network.closest_lane_index(position);
        let mut vehicle = Self {
            position,
            heading,
            speed,
            lane_index,
            crashed: false,
            on_road: true,
            kind: VehicleKind::Background(DriverModel::new(speed)),
            control: Control::default(),
        };
        vehicle.update_lane(network);
        vehicle
    }

    /// Creates a stationary, already crashed vehicle to be used as an obstacle.
    pub fn hazard(network: &RoadNetwork, position: Point2d, heading: f64) -> Self {
        Self {
            speed: 0.0,
            crashed: true,
            kind: VehicleKind::Hazard,
            ..Self::new(network, position, heading, 0.0)
        }
    }

    /// Converts the vehicle into one driven by the agent, holding its current lane.
    pub fn into_controlled(self) -> Self {
        let controller = Controller::new(self.lane_index, self.speed);
        Self {
            kind: VehicleKind::Controlled(controller),
            ..self
        }
    }

    /// The coordinates in world space of the centre of the vehicle.
    pub fn position(&self) -> Point2d {
        self.position
    }

    /// The heading in radians.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// A unit vector in world space aligned with the vehicle's heading.
    pub fn direction(&self) -> Vector2d {
        heading_vector(self.heading)
    }

    /// The vehicle's speed in m/s.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// The speed projected onto the vehicle's heading.
    pub fn forward_speed(&self) -> f64 {
        self.speed * self.heading.cos()
    }

    /// The lane the vehicle currently occupies.
    pub fn lane_index(&self) -> LaneIndex {
        self.lane_index
    }

    /// The lane the vehicle is heading for: the controller's target lane
    /// for a controlled vehicle, otherwise the lane it occupies.
    pub fn target_lane_index(&self) -> LaneIndex {
        match &self.kind {
            VehicleKind::Controlled(ctrl) => ctrl.target_lane_index(),
            _ => self.lane_index,
        }
    }

    /// Whether the vehicle has been in a collision.
    pub fn crashed(&self) -> bool {
        self.crashed
    }

    /// Whether the vehicle lies within the bounds of the road.
    pub fn on_road(&self) -> bool {
        self.on_road
    }

    /// What drives the vehicle.
    pub fn kind(&self) -> &VehicleKind {
        &self.kind
    }

    /// Mutable access to the vehicle's driver.
    pub fn kind_mut(&mut self) -> &mut VehicleKind {
        &mut self.kind
    }

    /// Whether this is a static hazard.
    pub fn is_hazard(&self) -> bool {
        matches!(self.kind, VehicleKind::Hazard)
    }

    /// Whether this vehicle takes the agent's actions.
    pub fn is_controlled(&self) -> bool {
        matches!(self.kind, VehicleKind::Controlled(_))
    }

    /// The vehicle's length in m.
    pub fn length(&self) -> f64 {
        VEHICLE_LENGTH
    }

    /// The vehicle's width in m.
    pub fn width(&self) -> f64 {
        VEHICLE_WIDTH
    }

    /// The four corners of the vehicle's footprint in world space.
    pub fn corners(&self) -> [Point2d; 4] {
        dynamics::corners(self.position, self.heading, VEHICLE_LENGTH, VEHICLE_WIDTH)
    }

    /// The straight line distance between the centres of two vehicles.
    pub fn distance_to(&self, other: &Vehicle) -> f64 {
        use cgmath::MetricSpace;
        self.position.distance(other.position)
    }

    pub(crate) fn state(&self) -> KinematicState {
        KinematicState {
            position: self.position,
            heading: self.heading,
            speed: self.speed,
        }
    }

    /// Passes a high level action to the vehicle's controller.
    /// Vehicles which are not controlled ignore it.
    pub(crate) fn act(&mut self, action: MetaAction, network: &RoadNetwork) {
        if let VehicleKind::Controlled(ctrl) = &mut self.kind {
            ctrl.act(action, network);
        }
    }

    /// Sets the control inputs for the next integration step.
    pub(crate) fn set_control(&mut self, control: Control) {
        self.control = control;
    }

    /// Marks the vehicle as crashed.
    pub(crate) fn crash(&mut self) {
        self.crashed = true;
    }

    /// Moves the vehicle, keeping its heading and speed.
    pub(crate) fn set_position(&mut self, position: Point2d, network: &RoadNetwork) {
        self.position = position;
        self.update_lane(network);
    }

    /// Integrates the vehicle's position, heading and speed.
    ///
    /// # Parameters
    /// * `dt` - The time step in seconds
    pub(crate) fn integrate(&mut self, dt: f64) {
        if self.is_hazard() {
            return;
        }
        let control = if self.crashed {
            crashed_control(self.speed)
        } else {
            self.control
        };
        let next = integrate(self.state(), control, 0.5 * VEHICLE_LENGTH, dt);
        self.position = next.position;
        self.heading = next.heading;
        self.speed = next.speed;
    }

    /// Updates the lane the vehicle occupies, and whether it is on the road.
    pub(crate) fn update_lane(&mut self, network: &RoadNetwork) {
        self.lane_index = network.closest_lane_index(self.position);
        self.on_road = network
            .get_lane(self.lane_index)
            .map(|lane| lane.on_lane(self.position, 0.0))
            .unwrap_or(false);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_4;

    fn network() -> RoadNetwork {
        RoadNetwork::straight_road_network(4, 1000.0, 30.0)
    }

    #[test]
    fn hazards_are_stopped_and_crashed() {
        let network = network();
        let mut hazard = Vehicle::hazard(&network, Point2d::new(500.0, 6.0), FRAC_PI_4);
        assert!(hazard.is_hazard());
        assert!(hazard.crashed());
        assert_eq!(hazard.speed(), 0.0);
        assert_eq!(hazard.lane_index().id, 1);

        let before = hazard.position();
        hazard.integrate(1.0);
        assert_eq!(hazard.position(), before);
    }

    #[test]
    fn controlled_target_lane() {
        let network = network();
        let mut vehicle = Vehicle::new(&network, Point2d::new(50.0, 4.0), 0.0, 25.0).into_controlled();
        assert!(vehicle.is_controlled());
        vehicle.act(MetaAction::LaneRight, &network);
        assert_eq!(vehicle.lane_index().id, 1);
        assert_eq!(vehicle.target_lane_index().id, 2);
    }

    #[test]
    fn forward_speed_projects_onto_heading() {
        let network = network();
        let vehicle = Vehicle::new(&network, Point2d::new(50.0, 0.0), FRAC_PI_4, 20.0);
        assert_approx_eq!(vehicle.forward_speed(), 20.0 * FRAC_PI_4.cos());
    }

    #[test]
    fn leaving_the_road() {
        let network = network();
        let mut vehicle = Vehicle::new(&network, Point2d::new(50.0, 0.0), 0.0, 20.0);
        assert!(vehicle.on_road());
        vehicle.set_position(Point2d::new(50.0, -2.5), &network);
        assert!(!vehicle.on_road());
        assert_eq!(vehicle.lane_index().id, 0);
    }
}
