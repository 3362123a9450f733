//! # fixed-wing-autopilot
//! A `#![no_std]` autopilot that flies a fixed-wing plane from the runway, through a cruise,
//! and back down onto the runway with nothing but finite differences of its telemetry.
//!
//! # Generic components
//! [`scheduler`] paces the control loop at a fixed tick.
//!
//! [`hal`] is the boundary to the vehicle: telemetry in, control channels out.
//!
//! [`filter`] estimates the derivatives of a sampled signal.
//!
//! [`config`] holds the tuning constants of a flight.
//!
//! # Fixed-wing components
//! [`Plane`] pairs a vehicle with a scheduler and drives its control channels
//! (see [`guidance`](plane::guidance) for target rates and [`control`](plane::control)
//! for the rate controllers).
//!
//! [`Maneuver`] is a phase of flight (see [`GroundRoll`], [`Climb`], [`Cruise`], [`Turn`]
//! and [`Approach`]) and [`Mission`] chains them into a full flight.
//!
//! # Logging
//! Enable the `defmt` feature to log maneuver progress with [`defmt`](https://docs.rs/defmt).

#![no_std]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod config;
pub use config::Config;

pub mod error;
pub use error::{ConfigError, Error};

pub mod filter;
pub use filter::{DerivativeSeries, Interval};

pub mod hal;
pub use hal::{Axis, Controls, Signal, Switch, Telemetry, Vehicle};

pub mod plane;
pub use plane::{
    Approach, Climb, Cruise, GroundRoll, Maneuver, Mission, MissionOutcome, Phase, Plane, Turn,
};

pub mod scheduler;
pub use scheduler::{FixedTick, Tick};
