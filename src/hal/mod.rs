//! The boundary between the autopilot and the vehicle it flies.
//!
//! Telemetry is read on demand through [`Telemetry`] and commands are written one channel
//! at a time through [`Controls`]. Both are implemented by whatever owns the connection to
//! the simulator or the airframe, and a failure of either is a lost link.

use nalgebra::Vector3;

/// A scalar telemetry quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    /// Altitude above mean sea level (in meters).
    MeanAltitude,
    /// Altitude above the terrain or runway surface (in meters).
    SurfaceAltitude,
    /// Bank angle (in degrees), positive to the right.
    Roll,
    /// Pitch angle (in degrees).
    Pitch,
    /// Compass heading (in degrees).
    Heading,
    /// Geodetic latitude (in degrees).
    Latitude,
    /// Geodetic longitude (in degrees).
    Longitude,
    /// Speed relative to the surface (in m/s).
    Speed,
}

impl Signal {
    pub fn name(self) -> &'static str {
        match self {
            Signal::MeanAltitude => "mean_altitude",
            Signal::SurfaceAltitude => "surface_altitude",
            Signal::Roll => "roll",
            Signal::Pitch => "pitch",
            Signal::Heading => "heading",
            Signal::Latitude => "latitude",
            Signal::Longitude => "longitude",
            Signal::Speed => "speed",
        }
    }
}

/// A normalized analog control channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// Elevator in [-1, 1].
    Pitch,
    /// Ailerons in [-1, 1].
    Roll,
    /// Throttle in [0, 1].
    Throttle,
}

/// A boolean control channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Switch {
    Gear,
    Brakes,
}

pub trait Telemetry {
    type Error;

    /// Sample the current value of a scalar signal.
    fn sample(&mut self, signal: Signal) -> Result<f64, Self::Error>;

    /// Sample the velocity (in m/s) in the hybrid frame: position from the orbited body,
    /// rotation from the local surface frame, so `x` points up.
    fn velocity(&mut self) -> Result<Vector3<f64>, Self::Error>;
}

pub trait Controls {
    type Error;

    /// Read the current value of an analog channel.
    fn axis(&mut self, axis: Axis) -> Result<f64, Self::Error>;

    /// Write an analog channel. The vehicle is expected to saturate out of range values.
    fn set_axis(&mut self, axis: Axis, value: f64) -> Result<(), Self::Error>;

    fn set_switch(&mut self, switch: Switch, on: bool) -> Result<(), Self::Error>;

    /// Fire the next stage, which ignites the engine on the runway.
    fn activate_next_stage(&mut self) -> Result<(), Self::Error>;

    /// Add `delta` to an analog channel and return the value written.
    fn nudge(&mut self, axis: Axis, delta: f64) -> Result<f64, Self::Error> {
        let value = self.axis(axis)? + delta;
        self.set_axis(axis, value)?;
        Ok(value)
    }
}

/// A vehicle that can be both sampled and commanded over one link.
pub trait Vehicle: Telemetry + Controls<Error = <Self as Telemetry>::Error> {}

impl<T> Vehicle for T where T: Telemetry + Controls<Error = <T as Telemetry>::Error> {}

/// The error of the link to a vehicle.
pub type LinkError<V> = <V as Telemetry>::Error;
