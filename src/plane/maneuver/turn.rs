use super::{Maneuver, Phase};
use crate::{
    config::Config,
    filter::DerivativeSeries,
    hal::{Axis, Signal, Switch, Vehicle},
    plane::{control::RateController, guidance::roll_from_heading, FlightResult, Plane},
    scheduler::Tick,
};
use core::ops::ControlFlow;

const PITCH_SENSITIVITY: f64 = 2.5;
const ROLL_SENSITIVITY: f64 = 0.5;
const ROLL_STEP_DIVISOR: f64 = 10.;

/// A banked turn at constant speed and altitude toward a heading limit.
///
/// The bank angle eases out as the heading approaches the limit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Turn {
    pub altitude_signal: Signal,
    /// Heading (in degrees) that ends the turn.
    pub heading_limit: f64,
    /// Speed (in m/s) held through the turn.
    pub turning_speed: f64,
    /// Bank angle (in degrees) at the start of the turn.
    pub bank_angle: f64,
    /// Heading offset (in degrees) of the easing curve.
    pub offset: f64,
}

impl Default for Turn {
    fn default() -> Self {
        Self {
            altitude_signal: Signal::MeanAltitude,
            heading_limit: 260.,
            turning_speed: 65.,
            bank_angle: 30.,
            offset: 10.,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurnState {
    pub previous_speed: f64,
    pub altitude: DerivativeSeries,
    pub roll: DerivativeSeries,
    pub initial_heading: f64,
}

impl Maneuver for Turn {
    type State = TurnState;

    fn phase(&self) -> Phase {
        Phase::Turn
    }

    fn enter<V, T>(&mut self, plane: &mut Plane<V, T>, config: &Config) -> FlightResult<TurnState, V>
    where
        V: Vehicle,
        T: Tick,
    {
        plane.set_switch(Switch::Gear, false)?;
        Ok(TurnState {
            previous_speed: plane.sample(Signal::Speed)?,
            altitude: plane.initial_derivatives(self.altitude_signal, &config.timing)?,
            roll: plane.initial_derivatives(Signal::Roll, &config.timing)?,
            initial_heading: plane.sample(Signal::Heading)?,
        })
    }

    fn step<V, T>(
        &mut self,
        state: &mut TurnState,
        plane: &mut Plane<V, T>,
        config: &Config,
    ) -> FlightResult<ControlFlow<()>, V>
    where
        V: Vehicle,
        T: Tick,
    {
        let heading = plane.sample(Signal::Heading)?;
        if heading >= self.heading_limit {
            return Ok(ControlFlow::Break(()));
        }

        let cruise = &config.cruise;
        let timing = &config.timing;

        state.previous_speed = plane.control_quantity(
            Signal::Speed,
            state.previous_speed,
            self.turning_speed,
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
        let bank = roll_from_heading(
            heading,
            state.initial_heading,
            self.heading_limit,
            self.bank_angle,
            self.offset,
        )?;
        let target_roll_rate = plane.symmetric_target_rate(
            Signal::Roll,
            bank,
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
