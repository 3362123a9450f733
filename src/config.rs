//! Tuning constants for a flight.
//!
//! A [`Config`] is built once, validated, and then only read. Every maneuver borrows it.
//! ```
//! use fixed_wing_autopilot::Config;
//!
//! let config = Config::builder()
//!     .cruise_altitude(100.)
//!     .cruise_speed(80.)
//!     .cruise_acceleration(150.)
//!     .sample_interval(0.005)
//!     .control_step(0.02)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.timing.interval.micros(), 5000);
//! ```

use crate::{
    error::ConfigError,
    filter::{Interval, MAX_LEVELS},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lowest derivative order whose advanced series carries the five derivatives read by the
/// rate controllers.
pub const MIN_DERIVATIVE_ORDER: usize = 4;

/// Loop timing and actuator resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Timing {
    /// Time between control ticks and between bootstrap samples.
    pub interval: Interval,
    /// Largest actuator increment of the rate controllers and the fixed throttle step.
    pub control_step: f64,
    /// Highest derivative order kept by a maneuver's derivative series, from
    /// [`MIN_DERIVATIVE_ORDER`] up to one less than [`MAX_LEVELS`].
    pub derivative_order: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cruise {
    /// Altitude (in meters) held in cruise and turns.
    pub altitude: f64,
    /// Speed (in m/s) held in cruise.
    pub speed: f64,
    /// Acceleration (in m/s^2) above which the throttle backs off.
    pub acceleration: f64,
    /// Bound on the target climb rate (in m/s). A quarter of it bounds the target roll rate.
    pub max_target_speed: f64,
    /// Target climb rate (in m/s) during take-off.
    pub take_off_climb_rate: f64,
    /// Ground speed (in m/s) that ends the ground roll.
    pub lift_off_speed: f64,
    /// Sensitivity of the asymmetric altitude planner.
    pub altitude_sensitivity: f64,
    /// Anti-sensitivity of the symmetric roll planner.
    pub roll_anti_sensitivity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Runway {
    /// Latitude (in degrees) of the runway centerline.
    pub center_latitude: f64,
    /// Longitude (in degrees) of the runway threshold.
    pub end_longitude: f64,
    /// Landing heading (in degrees).
    pub heading: f64,
    /// Full width (in degrees) of the heading window used by the alignment S-turn.
    pub correction_angle: f64,
    pub max_correction_roll: f64,
    pub min_correction_roll: f64,
    /// Minimum correction roll once the vehicle is already past the runway threshold.
    pub near_min_correction_roll: f64,
    /// Correction roll (in degrees) per degree of latitude away from the centerline.
    pub correction_roll_gain: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Approach {
    pub altitude: f64,
    pub speed: f64,
    /// Longitude distance (in degrees) before the threshold where the approach begins.
    pub offset: f64,
    /// Correction angle used once on approach.
    pub correction_angle: f64,
    pub landing_altitude: f64,
    /// Longitude distance (in degrees) before the threshold where the descent begins.
    pub landing_offset: f64,
    /// Speed that separates the flare from the touchdown once past the threshold.
    pub landing_speed: f64,
    pub flare_altitude: f64,
    pub flare_speed: f64,
    pub touchdown_altitude: f64,
    pub touchdown_speed: f64,
    /// Surface altitude (in meters) under which the vehicle is considered on the ground.
    pub ground_contact_altitude: f64,
    pub rollout_altitude: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub timing: Timing,
    pub cruise: Cruise,
    pub runway: Runway,
    pub approach: Approach,
}

impl Config {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Bound on the target roll rate (in degrees per second).
    pub fn max_roll_rate(&self) -> f64 {
        self.cruise.max_target_speed / 4.
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timing: Timing {
                interval: Interval(0.01),
                control_step: 0.01,
                derivative_order: 4,
            },
            cruise: Cruise {
                altitude: 100.,
                speed: 100.,
                acceleration: 10.,
                max_target_speed: 100.,
                take_off_climb_rate: 15.,
                lift_off_speed: 40.,
                altitude_sensitivity: 2.,
                roll_anti_sensitivity: 0.1,
            },
            runway: Runway {
                center_latitude: -0.0493255,
                end_longitude: -74.5,
                heading: 270.,
                correction_angle: 40.,
                max_correction_roll: 15.,
                min_correction_roll: 5.,
                near_min_correction_roll: 1.5,
                correction_roll_gain: 200.,
            },
            approach: Approach {
                altitude: 100.,
                speed: 80.,
                offset: 1.,
                correction_angle: 10.,
                landing_altitude: 100.,
                landing_offset: 0.25,
                landing_speed: 40.,
                flare_altitude: 35.,
                flare_speed: 20.,
                touchdown_altitude: 25.,
                touchdown_speed: 27.,
                ground_contact_altitude: 2.,
                rollout_altitude: 1.,
            },
        }
    }
}

macro_rules! setters {
    ($group:ident; $($setter:ident => $field:ident),* $(,)?) => {
        $(
            pub fn $setter(mut self, value: f64) -> Self {
                self.config.$group.$field = value;
                self
            }
        )*
    };
}

/// Builder for a validated [`Config`], starting from the defaults.
pub struct Builder {
    config: Config,
    interval: f64,
}

impl Default for Builder {
    fn default() -> Self {
        let config = Config::default();
        Self {
            interval: config.timing.interval.seconds(),
            config,
        }
    }
}

impl Builder {
    pub fn sample_interval(mut self, seconds: f64) -> Self {
        self.interval = seconds;
        self
    }

    pub fn control_step(mut self, step: f64) -> Self {
        self.config.timing.control_step = step;
        self
    }

    pub fn derivative_order(mut self, order: usize) -> Self {
        self.config.timing.derivative_order = order;
        self
    }

    pub fn cruise(mut self, cruise: Cruise) -> Self {
        self.config.cruise = cruise;
        self
    }

    pub fn cruise_altitude(mut self, altitude: f64) -> Self {
        self.config.cruise.altitude = altitude;
        self
    }

    pub fn cruise_speed(mut self, speed: f64) -> Self {
        self.config.cruise.speed = speed;
        self
    }

    pub fn cruise_acceleration(mut self, acceleration: f64) -> Self {
        self.config.cruise.acceleration = acceleration;
        self
    }

    pub fn lift_off_speed(mut self, speed: f64) -> Self {
        self.config.cruise.lift_off_speed = speed;
        self
    }

    pub fn take_off_climb_rate(mut self, rate: f64) -> Self {
        self.config.cruise.take_off_climb_rate = rate;
        self
    }

    pub fn max_target_speed(mut self, speed: f64) -> Self {
        self.config.cruise.max_target_speed = speed;
        self
    }

    pub fn altitude_sensitivity(mut self, sensitivity: f64) -> Self {
        self.config.cruise.altitude_sensitivity = sensitivity;
        self
    }

    pub fn roll_anti_sensitivity(mut self, anti_sensitivity: f64) -> Self {
        self.config.cruise.roll_anti_sensitivity = anti_sensitivity;
        self
    }

    pub fn runway(mut self, runway: Runway) -> Self {
        self.config.runway = runway;
        self
    }

    setters! { runway;
        runway_center_latitude => center_latitude,
        runway_end_longitude => end_longitude,
        runway_heading => heading,
        correction_angle => correction_angle,
        max_correction_roll => max_correction_roll,
        min_correction_roll => min_correction_roll,
        near_min_correction_roll => near_min_correction_roll,
        correction_roll_gain => correction_roll_gain,
    }

    pub fn approach(mut self, approach: Approach) -> Self {
        self.config.approach = approach;
        self
    }

    setters! { approach;
        approach_altitude => altitude,
        approach_speed => speed,
        approach_offset => offset,
        approach_correction_angle => correction_angle,
        landing_altitude => landing_altitude,
        landing_offset => landing_offset,
        landing_speed => landing_speed,
        flare_altitude => flare_altitude,
        flare_speed => flare_speed,
        touchdown_altitude => touchdown_altitude,
        touchdown_speed => touchdown_speed,
        ground_contact_altitude => ground_contact_altitude,
        rollout_altitude => rollout_altitude,
    }

    /// Use the same altitude for the approach as for the cruise.
    pub fn approach_at_cruise_altitude(mut self) -> Self {
        self.config.approach.altitude = self.config.cruise.altitude;
        self
    }

    pub fn build(mut self) -> Result<Config, ConfigError> {
        self.config.timing.interval = Interval::new(self.interval)?;

        let order = self.config.timing.derivative_order;
        if order < MIN_DERIVATIVE_ORDER || order + 1 > MAX_LEVELS {
            return Err(ConfigError::UnsupportedDerivativeOrder);
        }

        let step = self.config.timing.control_step;
        if !(step.is_finite() && step > 0.) {
            return Err(ConfigError::NonPositiveControlStep);
        }

        // Midpoints of the asymmetric quadratic planner
        let cruise = &self.config.cruise;
        let approach = &self.config.approach;
        let midpoints = [
            cruise.altitude,
            cruise.speed,
            approach.altitude,
            approach.landing_altitude,
            approach.flare_altitude,
            approach.touchdown_altitude,
            approach.rollout_altitude,
        ];
        if midpoints.iter().any(|&midpoint| midpoint == 0.) {
            return Err(ConfigError::ZeroMidpoint);
        }

        let runway = &self.config.runway;
        if runway.min_correction_roll > runway.max_correction_roll
            || runway.near_min_correction_roll > runway.max_correction_roll
        {
            return Err(ConfigError::InvertedBounds);
        }

        Ok(self.config)
    }
}
