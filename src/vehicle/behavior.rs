use crate::math::not_zero;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// The maximum acceleration magnitude of any background vehicle in m/s^2.
const MAX_ACC: f64 = 6.0;

/// The length of a vehicle in m.
const VEHICLE_LENGTH: f64 = 5.0;

/// The range the acceleration exponent is randomised within.
const DELTA_RANGE: (f64, f64) = (3.5, 4.5);

/// The range the time headway is randomised within, in s.
const HEADWAY_RANGE: (f64, f64) = (1.0, 2.0);

/// The standard deviation of the desired velocity adjustment factor.
const VELOCITY_ADJUST_STDDEV: f64 = 0.1;

/// The car following behaviour of a background vehicle,
/// based on the intelligent driver model.
#[derive(Clone, Debug)]
pub struct DriverModel {
    /// The speed the driver would like to travel at, in m/s.
    target_speed: f64,
    params: ModelParams,
}

/// The parameters of the driver model.
#[derive(Clone, Debug)]
pub struct ModelParams {
    /// The desired gap between this and the vehicle ahead in seconds.
    pub time_headway: f64,
    /// The desired centre to centre distance to a stopped vehicle ahead, in m.
    pub min_gap: f64,
    /// The vehicle's maximum comfortable acceleration in m/s<sup>2</sup>.
    pub max_acceleration: f64,
    /// The comfortable deceleration in m/s<sup>2</sup>, a positive number.
    pub comf_deceleration: f64,
    /// The exponent controlling how quickly acceleration falls off near the target speed.
    pub delta: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            time_headway: 1.5,
            min_gap: 5.0 + VEHICLE_LENGTH,
            max_acceleration: 3.0,
            comf_deceleration: 5.0,
            delta: 4.0,
        }
    }
}

impl DriverModel {
    /// Creates a driver with the default parameters.
    pub fn new(target_speed: f64) -> Self {
        Self {
            target_speed,
            params: Default::default(),
        }
    }

    /// Gets the speed the driver would like to travel at, in m/s.
    pub fn target_speed(&self) -> f64 {
        self.target_speed
    }

    /// Gets the driver's parameters.
    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// Randomly perturbs the driver's parameters, so that background traffic
    /// does not move in lockstep.
    pub fn randomize(&mut self, rng: &mut impl Rng) {
        let distr = Normal::new(1.0, VELOCITY_ADJUST_STDDEV).expect("Invalid standard deviation");
        let factor: f64 = distr.sample(rng);
        self.target_speed *= factor.clamp(0.75, 1.25);
        self.params.delta = rng.gen_range(DELTA_RANGE.0..DELTA_RANGE.1);
        self.params.time_headway = rng.gen_range(HEADWAY_RANGE.0..HEADWAY_RANGE.1);
    }

    /// Computes the driver's acceleration.
    ///
    /// # Arguments
    /// * `speed` - The speed of the simulated vehicle (m/s).
    /// * `front` - The centre to centre distance to the vehicle ahead in metres,
    ///   and its speed, if there is one.
    pub fn acceleration(&self, speed: f64, front: Option<(f64, f64)>) -> f64 {
        let p = &self.params;
        let free_road = 1.0 - (speed.max(0.0) / not_zero(self.target_speed)).powf(p.delta);
        let mut acc = p.max_acceleration * free_road;
        if let Some((distance, front_speed)) = front {
            let gap = self.desired_gap(speed, front_speed);
            acc -= p.max_acceleration * (gap / not_zero(distance)).powi(2);
        }
        acc.clamp(-MAX_ACC, MAX_ACC)
    }

    /// The gap the driver would like to keep to the vehicle ahead.
    fn desired_gap(&self, speed: f64, front_speed: f64) -> f64 {
        let p = &self.params;
        let appr = speed - front_speed;
        let factor = 1. / (2. * (p.max_acceleration * p.comf_deceleration).sqrt());
        p.min_gap + speed * p.time_headway + speed * appr * factor
    }
}
