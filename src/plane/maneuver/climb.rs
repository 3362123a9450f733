use super::{Maneuver, Phase};
use crate::{
    config::Config,
    filter::DerivativeSeries,
    hal::{Axis, Signal, Vehicle},
    plane::{control::RateController, FlightResult, Plane},
    scheduler::Tick,
};
use core::ops::ControlFlow;

/// Pitch sensitivity of the take-off climb.
const PITCH_SENSITIVITY: f64 = 1.;

/// Climb out at a fixed rate until the cruise altitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Climb {
    pub altitude_signal: Signal,
}

impl Default for Climb {
    fn default() -> Self {
        Self {
            altitude_signal: Signal::MeanAltitude,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClimbState {
    pub previous_speed: f64,
    pub altitude: DerivativeSeries,
}

impl Maneuver for Climb {
    type State = ClimbState;

    fn phase(&self) -> Phase {
        Phase::Climb
    }

    fn enter<V, T>(&mut self, plane: &mut Plane<V, T>, config: &Config) -> FlightResult<ClimbState, V>
    where
        V: Vehicle,
        T: Tick,
    {
        Ok(ClimbState {
            previous_speed: plane.sample(Signal::Speed)?,
            altitude: plane.initial_derivatives(self.altitude_signal, &config.timing)?,
        })
    }

    fn step<V, T>(
        &mut self,
        state: &mut ClimbState,
        plane: &mut Plane<V, T>,
        config: &Config,
    ) -> FlightResult<ControlFlow<()>, V>
    where
        V: Vehicle,
        T: Tick,
    {
        if plane.sample(self.altitude_signal)? >= config.cruise.altitude {
            return Ok(ControlFlow::Break(()));
        }

        state.previous_speed = plane.control_quantity(
            Signal::Speed,
            state.previous_speed,
            config.cruise.speed,
            config.cruise.acceleration,
            Axis::Throttle,
            &config.timing,
        )?;
        state.altitude = plane.angular_control_from_position(
            self.altitude_signal,
            &state.altitude,
            config.cruise.take_off_climb_rate,
            Axis::Pitch,
            RateController::new(config.timing.control_step, PITCH_SENSITIVITY),
            config.timing.interval,
        )?;

        Ok(ControlFlow::Continue(()))
    }
}
