//! Runway alignment, approach and landing.
//!
//! The plane flies an S-turn onto the runway centerline (see [`lateral`](crate::plane::lateral))
//! while a series of gates, triggered by the longitude to the runway threshold and the
//! ground speed, lowers the altitude and speed setpoints and softens the controllers for the
//! descent, flare, touchdown and rollout.

use super::{Maneuver, Phase};
use crate::{
    config::Config,
    filter::DerivativeSeries,
    hal::{Axis, Signal, Switch, Vehicle},
    plane::{
        control::RateController,
        lateral::{Alignment, LateralMode},
        FlightResult, Plane,
    },
    scheduler::Tick,
};
use core::ops::ControlFlow;
use num_traits::Float;

const INITIAL_PITCH_SENSITIVITY: f64 = 3.;
const INITIAL_ROLL_SENSITIVITY: f64 = 2.;
const LANDING_ROLL_SENSITIVITY: f64 = 0.75;
const FLARE_PITCH_SENSITIVITY: f64 = 1.5;
const FLARE_ROLL_SENSITIVITY: f64 = 0.5;
const TOUCHDOWN_PITCH_SENSITIVITY: f64 = 1.;
const TOUCHDOWN_ROLL_SENSITIVITY: f64 = 0.15;

/// The roll controller steps this many times finer than the pitch controller.
const ROLL_STEP_DIVISOR: f64 = 8.;

/// Bank angle (in degrees) under which the wings count as level for the release.
const RELEASE_ROLL: f64 = 1.;

/// The furthest gate passed on the current tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gate {
    /// More than the approach offset from the threshold: cruise setpoints.
    Cruise,
    /// Within the approach offset: approach altitude and speed.
    Approach,
    /// Within the landing offset: landing altitude and speed and a softer roll.
    Landing,
    /// Past the threshold and still fast: gear down and hold the flare above the surface.
    Flare,
    /// Past the threshold and slowed down: settle onto the runway.
    Touchdown,
    /// On the ground: brakes on and throttle back.
    Rollout,
}

/// Align with the runway and land.
///
/// One flight of this maneuver is one pass: it ends when the plane crosses the centerline
/// or levels its wings on it. The [`Mission`](crate::plane::Mission) repeats passes until
/// the plane stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Approach {
    pub altitude_signal: Signal,
}

impl Default for Approach {
    fn default() -> Self {
        Self {
            altitude_signal: Signal::MeanAltitude,
        }
    }
}

/// Setpoints and controller tuning of one approach pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproachState {
    pub previous_speed: f64,
    pub altitude: DerivativeSeries,
    pub roll: DerivativeSeries,
    pub alignment: Alignment,
    /// The altitude signal tracked, switched to the surface altitude at the flare.
    pub altitude_signal: Signal,
    pub altitude_setpoint: f64,
    pub speed_setpoint: f64,
    pub pitch_sensitivity: f64,
    pub roll_sensitivity: f64,
    pub correction_angle: f64,
    /// Speed that separates the flare from the touchdown.
    pub gate_speed: f64,
    pub gate: Gate,
}

impl ApproachState {
    /// Apply every gate the plane is past, in order, and return the last one.
    fn pass_gates<V, T>(&mut self, plane: &mut Plane<V, T>, config: &Config) -> FlightResult<Gate, V>
    where
        V: Vehicle,
        T: Tick,
    {
        let runway = &config.runway;
        let approach = &config.approach;

        let longitude = plane.sample(Signal::Longitude)?;
        let speed = plane.sample(Signal::Speed)?;
        let surface_altitude = plane.sample(Signal::SurfaceAltitude)?;
        let past_threshold = longitude < runway.end_longitude;

        let mut gate = Gate::Cruise;
        if longitude < runway.end_longitude + approach.offset {
            gate = Gate::Approach;
            self.speed_setpoint = approach.speed;
            self.altitude_setpoint = approach.altitude;
            self.correction_angle = approach.correction_angle;
        }
        if longitude < runway.end_longitude + approach.landing_offset {
            gate = Gate::Landing;
            self.altitude_setpoint = approach.landing_altitude;
            self.speed_setpoint = approach.landing_speed;
            self.gate_speed = approach.landing_speed;
            self.roll_sensitivity = LANDING_ROLL_SENSITIVITY;
        }
        if past_threshold && speed > self.gate_speed {
            gate = Gate::Flare;
            self.altitude_signal = Signal::SurfaceAltitude;
            self.altitude_setpoint = approach.flare_altitude;
            self.speed_setpoint = approach.flare_speed;
            self.pitch_sensitivity = FLARE_PITCH_SENSITIVITY;
            self.roll_sensitivity = FLARE_ROLL_SENSITIVITY;
        }
        if past_threshold && speed < self.gate_speed {
            gate = Gate::Touchdown;
            self.altitude_setpoint = approach.touchdown_altitude;
            self.speed_setpoint = approach.touchdown_speed;
            self.pitch_sensitivity = TOUCHDOWN_PITCH_SENSITIVITY;
            self.roll_sensitivity = TOUCHDOWN_ROLL_SENSITIVITY;
        }
        if surface_altitude < approach.ground_contact_altitude {
            gate = Gate::Rollout;
            self.altitude_setpoint = approach.rollout_altitude;
            self.speed_setpoint = 0.;
        }

        if gate != self.gate {
            debug!("approach gate {}", gate);
            match gate {
                Gate::Flare => {
                    info!("flare at {} m/s", speed);
                    plane.set_switch(Switch::Gear, true)?;
                }
                Gate::Touchdown => {
                    info!("landing at {} m/s", speed);
                    plane.set_switch(Switch::Gear, true)?;
                }
                Gate::Rollout => plane.set_switch(Switch::Brakes, true)?,
                _ => {}
            }
            self.gate = gate;
        }

        Ok(gate)
    }
}

impl Maneuver for Approach {
    type State = ApproachState;

    fn phase(&self) -> Phase {
        Phase::Approach
    }

    fn enter<V, T>(&mut self, plane: &mut Plane<V, T>, config: &Config) -> FlightResult<ApproachState, V>
    where
        V: Vehicle,
        T: Tick,
    {
        plane.set_switch(Switch::Gear, false)?;

        let previous_speed = plane.sample(Signal::Speed)?;
        let altitude = plane.initial_derivatives(self.altitude_signal, &config.timing)?;
        let roll = plane.initial_derivatives(Signal::Roll, &config.timing)?;

        let latitude = plane.sample(Signal::Latitude)?;
        let past_threshold = plane.sample(Signal::Longitude)? < config.runway.end_longitude;
        let alignment = Alignment::new(latitude, past_threshold, &config.runway);
        info!(
            "correction roll {} from the {} side",
            alignment.correction_roll,
            alignment.side
        );

        Ok(ApproachState {
            previous_speed,
            altitude,
            roll,
            alignment,
            altitude_signal: self.altitude_signal,
            altitude_setpoint: config.cruise.altitude,
            speed_setpoint: config.cruise.speed,
            pitch_sensitivity: INITIAL_PITCH_SENSITIVITY,
            roll_sensitivity: INITIAL_ROLL_SENSITIVITY,
            correction_angle: config.runway.correction_angle,
            gate_speed: config.approach.speed,
            gate: Gate::Cruise,
        })
    }

    fn step<V, T>(
        &mut self,
        state: &mut ApproachState,
        plane: &mut Plane<V, T>,
        config: &Config,
    ) -> FlightResult<ControlFlow<()>, V>
    where
        V: Vehicle,
        T: Tick,
    {
        let runway = &config.runway;
        let timing = &config.timing;

        let latitude = plane.sample(Signal::Latitude)?;
        if !state.alignment.side.is_outside(latitude, runway.center_latitude) {
            return Ok(ControlFlow::Break(()));
        }

        state.pass_gates(plane, config)?;

        let target_climb_rate = plane.quadratic_target_rate(
            state.altitude_signal,
            state.altitude_setpoint,
            config.cruise.max_target_speed,
            config.cruise.altitude_sensitivity,
        )?;
        state.altitude = plane.angular_control_from_position(
            state.altitude_signal,
            &state.altitude,
            target_climb_rate,
            Axis::Pitch,
            RateController::new(timing.control_step, state.pitch_sensitivity),
            timing.interval,
        )?;
        state.previous_speed = plane.control_quantity(
            Signal::Speed,
            state.previous_speed,
            state.speed_setpoint,
            config.cruise.acceleration,
            Axis::Throttle,
            timing,
        )?;

        let heading = plane.sample(Signal::Heading)?;
        let latitude = plane.sample(Signal::Latitude)?;
        let mode = state
            .alignment
            .update(heading, latitude, runway, state.correction_angle);

        let setpoint = mode.roll_setpoint(state.alignment.side, state.alignment.correction_roll);
        let target_roll_rate = match setpoint {
            Some(roll) => plane.symmetric_target_rate(
                Signal::Roll,
                roll,
                config.max_roll_rate(),
                config.cruise.roll_anti_sensitivity,
            )?,
            None => 0.,
        };

        if mode == LateralMode::Release {
            let roll = plane.sample(Signal::Roll)?;
            if roll.abs() < RELEASE_ROLL {
                debug!("released on the centerline at roll {}", roll);
                return Ok(ControlFlow::Break(()));
            }
        }

        state.roll = plane.angular_control_from_position(
            Signal::Roll,
            &state.roll,
            target_roll_rate,
            Axis::Roll,
            RateController::new(timing.control_step / ROLL_STEP_DIVISOR, state.roll_sensitivity),
            timing.interval,
        )?;

        Ok(ControlFlow::Continue(()))
    }
}
