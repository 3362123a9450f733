use super::{Maneuver, Phase};
use crate::{
    config::Config,
    hal::{Axis, Signal, Switch, Vehicle},
    plane::{FlightResult, Plane},
    scheduler::Tick,
};
use core::ops::ControlFlow;

/// Ignite the engine, release the brakes and accelerate down the runway until the
/// lift-off speed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroundRoll;

impl Maneuver for GroundRoll {
    /// The speed sampled on the previous tick.
    type State = f64;

    fn phase(&self) -> Phase {
        Phase::GroundRoll
    }

    fn enter<V, T>(&mut self, plane: &mut Plane<V, T>, _config: &Config) -> FlightResult<f64, V>
    where
        V: Vehicle,
        T: Tick,
    {
        plane.activate_next_stage()?;
        plane.set_switch(Switch::Brakes, false)?;
        plane.sample(Signal::Speed)
    }

    fn step<V, T>(
        &mut self,
        previous_speed: &mut f64,
        plane: &mut Plane<V, T>,
        config: &Config,
    ) -> FlightResult<ControlFlow<()>, V>
    where
        V: Vehicle,
        T: Tick,
    {
        if plane.sample(Signal::Speed)? >= config.cruise.lift_off_speed {
            return Ok(ControlFlow::Break(()));
        }

        *previous_speed = plane.control_quantity(
            Signal::Speed,
            *previous_speed,
            config.cruise.speed,
            config.cruise.acceleration,
            Axis::Throttle,
            &config.timing,
        )?;

        Ok(ControlFlow::Continue(()))
    }
}
