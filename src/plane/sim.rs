//! A scripted vehicle for exercising maneuvers without a simulator.
//!
//! Every signal is a function of the number of ticks elapsed. The ticker and the vehicle
//! share that count, so a maneuver sees its telemetry move exactly once per control tick.

use super::Plane;
use crate::{
    filter::Interval,
    hal::{Axis, Controls, Signal, Switch, Telemetry},
    scheduler::{Error, Tick},
};
use core::cell::Cell;
use nalgebra::Vector3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LinkDown;

fn zero(_: u32) -> f64 {
    0.
}

fn still(_: u32) -> Vector3<f64> {
    Vector3::zeros()
}

pub(crate) struct Script {
    time: Cell<u32>,
    signals: [fn(u32) -> f64; 8],
    velocity: fn(u32) -> Vector3<f64>,
    fail_after: Option<u32>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            time: Cell::new(0),
            signals: [zero as fn(u32) -> f64; 8],
            velocity: still,
            fail_after: None,
        }
    }
}

impl Script {
    pub(crate) fn signal(mut self, signal: Signal, f: fn(u32) -> f64) -> Self {
        self.signals[signal as usize] = f;
        self
    }

    pub(crate) fn velocity(mut self, f: fn(u32) -> Vector3<f64>) -> Self {
        self.velocity = f;
        self
    }

    /// Drop the link after `operations` reads and writes.
    pub(crate) fn fail_after(mut self, operations: u32) -> Self {
        self.fail_after = Some(operations);
        self
    }

    /// Ticks elapsed so far.
    pub(crate) fn now(&self) -> u32 {
        self.time.get()
    }

    pub(crate) fn plane(&self) -> Plane<ScriptedVehicle<'_>, SimTicker<'_>> {
        Plane::new(
            ScriptedVehicle {
                script: self,
                axes: [0.; 3],
                gear: true,
                brakes: true,
                stages: 0,
                operations: 0,
            },
            SimTicker { time: &self.time },
        )
    }
}

pub(crate) struct SimTicker<'a> {
    time: &'a Cell<u32>,
}

impl Tick for SimTicker<'_> {
    fn tick(&mut self, _period: Interval) -> Result<(), Error> {
        self.time.set(self.time.get() + 1);
        Ok(())
    }
}

pub(crate) struct ScriptedVehicle<'a> {
    script: &'a Script,
    axes: [f64; 3],
    pub(crate) gear: bool,
    pub(crate) brakes: bool,
    pub(crate) stages: u32,
    operations: u32,
}

impl ScriptedVehicle<'_> {
    pub(crate) fn axis_value(&self, axis: Axis) -> f64 {
        self.axes[axis as usize]
    }

    fn link(&mut self) -> Result<(), LinkDown> {
        if let Some(limit) = self.script.fail_after {
            if self.operations >= limit {
                return Err(LinkDown);
            }
        }
        self.operations += 1;
        Ok(())
    }
}

impl Telemetry for ScriptedVehicle<'_> {
    type Error = LinkDown;

    fn sample(&mut self, signal: Signal) -> Result<f64, Self::Error> {
        self.link()?;
        Ok((self.script.signals[signal as usize])(self.script.now()))
    }

    fn velocity(&mut self) -> Result<Vector3<f64>, Self::Error> {
        self.link()?;
        Ok((self.script.velocity)(self.script.now()))
    }
}

impl Controls for ScriptedVehicle<'_> {
    type Error = LinkDown;

    fn axis(&mut self, axis: Axis) -> Result<f64, Self::Error> {
        self.link()?;
        Ok(self.axes[axis as usize])
    }

    fn set_axis(&mut self, axis: Axis, value: f64) -> Result<(), Self::Error> {
        self.link()?;
        self.axes[axis as usize] = value;
        Ok(())
    }

    fn set_switch(&mut self, switch: Switch, on: bool) -> Result<(), Self::Error> {
        self.link()?;
        match switch {
            Switch::Gear => self.gear = on,
            Switch::Brakes => self.brakes = on,
        }
        Ok(())
    }

    fn activate_next_stage(&mut self) -> Result<(), Self::Error> {
        self.link()?;
        self.stages += 1;
        Ok(())
    }
}
