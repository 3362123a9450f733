//! Fixed-wing flight control.
//!
//! A [`Plane`] pairs the vehicle link with the scheduler that paces the control loop. The
//! [`maneuver`]s drive it phase by phase and the [`Mission`] chains them from the runway
//! back to the runway.

use crate::{
    config::Timing,
    error::Error,
    filter::{DerivativeSeries, Interval, MAX_LEVELS},
    hal::{Axis, LinkError, Signal, Switch, Vehicle},
    scheduler::Tick,
};
use nalgebra::Vector3;

pub mod control;
use control::{throttle_step, RateController};

pub mod guidance;

pub mod lateral;

pub mod maneuver;
pub use maneuver::{Approach, Climb, Cruise, GroundRoll, Maneuver, Phase, Turn};

pub mod mission;
pub use mission::{Mission, MissionOutcome};

#[cfg(test)]
pub(crate) mod sim;

/// The result of an operation on a plane flying vehicle `V`.
pub type FlightResult<T, V> = Result<T, Error<LinkError<V>>>;

pub struct Plane<V, T> {
    pub vehicle: V,
    pub ticker: T,
}

impl<V, T> Plane<V, T>
where
    V: Vehicle,
    T: Tick,
{
    pub fn new(vehicle: V, ticker: T) -> Self {
        Self { vehicle, ticker }
    }

    pub fn sample(&mut self, signal: Signal) -> FlightResult<f64, V> {
        self.vehicle.sample(signal).map_err(Error::Link)
    }

    pub fn velocity(&mut self) -> FlightResult<Vector3<f64>, V> {
        self.vehicle.velocity().map_err(Error::Link)
    }

    pub fn nudge(&mut self, axis: Axis, delta: f64) -> FlightResult<f64, V> {
        self.vehicle.nudge(axis, delta).map_err(Error::Link)
    }

    pub fn set_switch(&mut self, switch: Switch, on: bool) -> FlightResult<(), V> {
        self.vehicle.set_switch(switch, on).map_err(Error::Link)
    }

    pub fn activate_next_stage(&mut self) -> FlightResult<(), V> {
        self.vehicle.activate_next_stage().map_err(Error::Link)
    }

    /// Wait for the next control tick.
    pub fn tick(&mut self, interval: Interval) -> FlightResult<(), V> {
        self.ticker.tick(interval)?;
        Ok(())
    }

    /// Sample a signal `samples` times, one tick apart, and estimate its derivatives.
    ///
    /// At most [`MAX_LEVELS`] samples are taken.
    pub fn bootstrap(
        &mut self,
        signal: Signal,
        samples: usize,
        interval: Interval,
    ) -> FlightResult<DerivativeSeries, V> {
        let mut buffer = [0.; MAX_LEVELS];
        let count = samples.min(MAX_LEVELS);

        for sample in &mut buffer[..count] {
            *sample = self.sample(signal)?;
            self.tick(interval)?;
        }

        Ok(DerivativeSeries::from_samples(&buffer[..count], interval))
    }

    /// Estimate the derivatives of a signal up to the configured order.
    pub fn initial_derivatives(
        &mut self,
        signal: Signal,
        timing: &Timing,
    ) -> FlightResult<DerivativeSeries, V> {
        self.bootstrap(signal, timing.derivative_order + 1, timing.interval)
    }

    /// Target rate of a signal toward an absolute setpoint.
    /// See [`guidance::quadratic_target_rate`].
    pub fn quadratic_target_rate(
        &mut self,
        signal: Signal,
        midpoint: f64,
        bound: f64,
        sensitivity: f64,
    ) -> FlightResult<f64, V> {
        let value = self.sample(signal)?;
        Ok(guidance::quadratic_target_rate(
            value,
            midpoint,
            bound,
            sensitivity,
        )?)
    }

    /// Target rate of a signal toward a setpoint that may be zero.
    /// See [`guidance::symmetric_target_rate`].
    pub fn symmetric_target_rate(
        &mut self,
        signal: Signal,
        midpoint: f64,
        bound: f64,
        anti_sensitivity: f64,
    ) -> FlightResult<f64, V> {
        let value = self.sample(signal)?;
        Ok(guidance::symmetric_target_rate(
            value,
            midpoint,
            bound,
            anti_sensitivity,
        ))
    }

    /// Steer the rate of `signal` toward `target_rate` with the actuator `axis`.
    ///
    /// Returns the derivatives to pass in on the next tick.
    pub fn angular_control_from_position(
        &mut self,
        signal: Signal,
        derivatives: &DerivativeSeries,
        target_rate: f64,
        axis: Axis,
        controller: RateController,
        interval: Interval,
    ) -> FlightResult<DerivativeSeries, V> {
        let sample = self.sample(signal)?;
        let derivatives = derivatives.advance(sample, interval);

        if let Some(delta) = controller.command(&derivatives, target_rate) {
            self.nudge(axis, delta)?;
        }

        Ok(derivatives.truncated())
    }

    /// Step `axis` up while `signal` is under `bound` and rising slower than `rate_bound`,
    /// and down otherwise.
    ///
    /// Returns the current value of the signal to pass in as `previous` on the next tick.
    pub fn control_quantity(
        &mut self,
        signal: Signal,
        previous: f64,
        bound: f64,
        rate_bound: f64,
        axis: Axis,
        timing: &Timing,
    ) -> FlightResult<f64, V> {
        let current = self.sample(signal)?;
        let delta = throttle_step(
            current,
            previous,
            bound,
            rate_bound,
            timing.interval,
            timing.control_step,
        );
        self.nudge(axis, delta)?;

        Ok(current)
    }
}
