use super::{Maneuver, Phase};
use crate::{
    config::Config,
    filter::DerivativeSeries,
    hal::{Axis, Signal, Switch, Vehicle},
    plane::{control::RateController, FlightResult, Plane},
    scheduler::Tick,
};
use core::ops::ControlFlow;
use num_traits::Float;

const PITCH_SENSITIVITY: f64 = 2.;
const ROLL_SENSITIVITY: f64 = 0.5;

/// The roll controller steps this many times finer than the pitch controller.
const ROLL_STEP_DIVISOR: f64 = 10.;

/// The direction of travel along the parallel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Toward increasing longitude.
    East,
    /// Toward decreasing longitude.
    West,
}

impl Direction {
    /// Returns `true` once `longitude` has reached `bound` in this direction.
    pub fn has_reached(self, longitude: f64, bound: f64) -> bool {
        match self {
            Direction::East => longitude >= bound,
            Direction::West => longitude <= bound,
        }
    }
}

/// Straight and level flight at the cruise altitude and speed until a longitude bound.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cruise {
    pub altitude_signal: Signal,
    /// Longitude (in degrees) that ends the cruise.
    pub longitude_bound: f64,
    pub direction: Direction,
    error_sum: f64,
    error_samples: u32,
}

impl Default for Cruise {
    fn default() -> Self {
        Self::new(-74.3, Direction::East)
    }
}

impl Cruise {
    pub fn new(longitude_bound: f64, direction: Direction) -> Self {
        Self {
            altitude_signal: Signal::MeanAltitude,
            longitude_bound,
            direction,
            error_sum: 0.,
            error_samples: 0,
        }
    }

    /// Mean absolute difference (in m/s) between the estimated climb rate and the measured
    /// vertical velocity over the last flight of this maneuver.
    pub fn climb_rate_error(&self) -> Option<f64> {
        if self.error_samples == 0 {
            None
        } else {
            Some(self.error_sum / self.error_samples as f64)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CruiseState {
    pub previous_speed: f64,
    pub altitude: DerivativeSeries,
    pub roll: DerivativeSeries,
}

impl Maneuver for Cruise {
    type State = CruiseState;

    fn phase(&self) -> Phase {
        Phase::Cruise
    }

    fn enter<V, T>(&mut self, plane: &mut Plane<V, T>, config: &Config) -> FlightResult<CruiseState, V>
    where
        V: Vehicle,
        T: Tick,
    {
        self.error_sum = 0.;
        self.error_samples = 0;

        plane.set_switch(Switch::Gear, false)?;
        Ok(CruiseState {
            previous_speed: plane.sample(Signal::Speed)?,
            altitude: plane.initial_derivatives(self.altitude_signal, &config.timing)?,
            roll: plane.initial_derivatives(Signal::Roll, &config.timing)?,
        })
    }

    fn step<V, T>(
        &mut self,
        state: &mut CruiseState,
        plane: &mut Plane<V, T>,
        config: &Config,
    ) -> FlightResult<ControlFlow<()>, V>
    where
        V: Vehicle,
        T: Tick,
    {
        let longitude = plane.sample(Signal::Longitude)?;
        if self.direction.has_reached(longitude, self.longitude_bound) {
            return Ok(ControlFlow::Break(()));
        }

        let cruise = &config.cruise;
        let timing = &config.timing;

        state.previous_speed = plane.control_quantity(
            Signal::Speed,
            state.previous_speed,
            cruise.speed,
            cruise.acceleration,
            Axis::Throttle,
            timing,
        )?;

        let target_climb_rate = plane.quadratic_target_rate(
            self.altitude_signal,
            cruise.altitude,
            cruise.max_target_speed,
            cruise.altitude_sensitivity,
        )?;
        let target_roll_rate = plane.symmetric_target_rate(
            Signal::Roll,
            0.,
            config.max_roll_rate(),
            cruise.roll_anti_sensitivity,
        )?;

        state.altitude = plane.angular_control_from_position(
            self.altitude_signal,
            &state.altitude,
            target_climb_rate,
            Axis::Pitch,
            RateController::new(timing.control_step, PITCH_SENSITIVITY),
            timing.interval,
        )?;

        if let Some(climb_rate) = state.altitude.rate() {
            let vertical_speed = plane.velocity()?.x;
            self.error_sum += (climb_rate - vertical_speed).abs();
            self.error_samples += 1;
            trace!("climb rate error {}", self.error_sum / self.error_samples as f64);
        }

        state.roll = plane.angular_control_from_position(
            Signal::Roll,
            &state.roll,
            target_roll_rate,
            Axis::Roll,
            RateController::new(timing.control_step / ROLL_STEP_DIVISOR, ROLL_SENSITIVITY),
            timing.interval,
        )?;

        Ok(ControlFlow::Continue(()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Cruise, Direction};
    use crate::{
        config::Config,
        hal::{Axis, Signal},
        plane::{sim::Script, Maneuver},
    };
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn direction_bounds() {
        assert!(Direction::East.has_reached(-74.3, -74.3));
        assert!(!Direction::East.has_reached(-74.4, -74.3));
        assert!(Direction::West.has_reached(-74.4, -74.3));
        assert!(!Direction::West.has_reached(-74.2, -74.3));
    }

    #[test]
    fn flies_east_to_the_bound_wings_level() {
        let script = Script::default()
            .signal(Signal::Longitude, |t| -75. + t as f64 / 64.)
            .signal(Signal::MeanAltitude, |_| 100.);
        let config = Config::default();
        let mut plane = script.plane();

        let mut cruise = Cruise::new(-74.5, Direction::East);
        cruise.fly(&mut plane, &config).unwrap();

        // Ten bootstrap ticks, then steps until the bound at tick 32
        assert_eq!(script.now(), 32);
        assert!(!plane.vehicle.gear);
        assert_eq!(plane.vehicle.axis_value(Axis::Roll), 0.);
        assert_eq!(plane.vehicle.axis_value(Axis::Pitch), 0.);
        assert_relative_eq!(plane.vehicle.axis_value(Axis::Throttle), 0.22, max_relative = 1e-9);
        assert_eq!(cruise.climb_rate_error(), Some(0.));
    }

    #[test]
    fn flies_west_to_the_bound() {
        let script = Script::default().signal(Signal::Longitude, |t| -74. - t as f64 / 64.);
        let config = Config::default();
        let mut plane = script.plane();

        Cruise::new(-74.5, Direction::West)
            .fly(&mut plane, &config)
            .unwrap();

        assert_eq!(script.now(), 32);
    }

    #[test]
    fn tracks_climb_rate_error() {
        let script = Script::default()
            .signal(Signal::Longitude, |t| -75. + t as f64 / 64.)
            .signal(Signal::MeanAltitude, |_| 100.)
            .velocity(|_| Vector3::new(2., 0., 0.));
        let config = Config::default();
        let mut plane = script.plane();

        let mut cruise = Cruise::new(-74.5, Direction::East);
        assert_eq!(cruise.climb_rate_error(), None);

        cruise.fly(&mut plane, &config).unwrap();
        assert_relative_eq!(cruise.climb_rate_error().unwrap(), 2.);
    }
}
