//! The phases of a flight.
//!
//! Each maneuver captures its working state on entry, then runs one control step per tick
//! until its exit condition holds. Nothing carries over from one maneuver to the next
//! except the [`Config`].

use super::{FlightResult, Plane};
use crate::{config::Config, hal::Vehicle, scheduler::Tick};
use core::ops::ControlFlow;

mod approach;
pub use approach::{Approach, ApproachState, Gate};

mod climb;
pub use climb::{Climb, ClimbState};

mod cruise;
pub use cruise::{Cruise, CruiseState, Direction};

mod ground_roll;
pub use ground_roll::GroundRoll;

mod turn;
pub use turn::{Turn, TurnState};

/// The phase of a flight a plane is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    GroundRoll,
    Climb,
    Cruise,
    Turn,
    Approach,
    Landed,
}

pub trait Maneuver {
    /// Working state captured on entry and discarded on exit.
    type State;

    fn phase(&self) -> Phase;

    /// Prepare the vehicle and capture the initial state.
    fn enter<V, T>(&mut self, plane: &mut Plane<V, T>, config: &Config) -> FlightResult<Self::State, V>
    where
        V: Vehicle,
        T: Tick;

    /// Run one control step, or break once the exit condition holds.
    fn step<V, T>(
        &mut self,
        state: &mut Self::State,
        plane: &mut Plane<V, T>,
        config: &Config,
    ) -> FlightResult<ControlFlow<()>, V>
    where
        V: Vehicle,
        T: Tick;

    /// Fly the maneuver to completion, one step per tick.
    fn fly<V, T>(&mut self, plane: &mut Plane<V, T>, config: &Config) -> FlightResult<(), V>
    where
        V: Vehicle,
        T: Tick,
    {
        let phase = self.phase();
        info!("{} started", phase);

        let mut state = self.enter(plane, config)?;
        while let ControlFlow::Continue(()) = self.step(&mut state, plane, config)? {
            plane.tick(config.timing.interval)?;
        }

        info!("{} complete", phase);
        Ok(())
    }
}
