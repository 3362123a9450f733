//! A full flight from the runway back to the runway.

use super::{
    maneuver::{Approach, Climb, Cruise, GroundRoll, Maneuver, Phase, Turn},
    FlightResult, Plane,
};
use crate::{
    config::Config,
    hal::{Signal, Vehicle},
    scheduler::Tick,
};

/// How a mission ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MissionOutcome {
    /// The plane came to a stop after `passes` approaches.
    Landed { passes: u32 },
    /// The plane was still moving after the last allowed approach.
    Stalled { passes: u32 },
}

/// Sequence the maneuvers of a flight: ground roll, climb, cruise, an optional turn, then
/// approach passes until the plane has stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mission {
    pub ground_roll: GroundRoll,
    pub climb: Climb,
    pub cruise: Cruise,
    pub turn: Option<Turn>,
    pub approach: Approach,
    /// Ground speed (in m/s) at or under which the plane has stopped.
    pub stop_speed: f64,
    /// Most approach passes flown before giving up.
    pub max_passes: u32,
    phase: Phase,
}

impl Default for Mission {
    fn default() -> Self {
        Self::new(Cruise::default())
    }
}

impl Mission {
    pub fn new(cruise: Cruise) -> Self {
        Self {
            ground_roll: GroundRoll,
            climb: Climb::default(),
            cruise,
            turn: None,
            approach: Approach::default(),
            stop_speed: 1.,
            max_passes: 10,
            phase: Phase::GroundRoll,
        }
    }

    /// Turn between the cruise and the approach.
    pub fn with_turn(mut self, turn: Turn) -> Self {
        self.turn = Some(turn);
        self
    }

    /// The phase currently flown, or the last one flown.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Fly the whole mission.
    pub fn fly<V, T>(
        &mut self,
        plane: &mut Plane<V, T>,
        config: &Config,
    ) -> FlightResult<MissionOutcome, V>
    where
        V: Vehicle,
        T: Tick,
    {
        run(&mut self.phase, &mut self.ground_roll, plane, config)?;
        run(&mut self.phase, &mut self.climb, plane, config)?;
        run(&mut self.phase, &mut self.cruise, plane, config)?;
        if let Some(turn) = &mut self.turn {
            run(&mut self.phase, turn, plane, config)?;
        }

        let mut passes = 0;
        loop {
            if plane.sample(Signal::Speed)? <= self.stop_speed {
                self.phase = Phase::Landed;
                info!("landed after {} passes", passes);
                return Ok(MissionOutcome::Landed { passes });
            }
            if passes >= self.max_passes {
                warn!("still moving after {} passes", passes);
                return Ok(MissionOutcome::Stalled { passes });
            }

            passes += 1;
            run(&mut self.phase, &mut self.approach, plane, config)?;
        }
    }
}

fn run<M, V, T>(
    phase: &mut Phase,
    maneuver: &mut M,
    plane: &mut Plane<V, T>,
    config: &Config,
) -> FlightResult<(), V>
where
    M: Maneuver,
    V: Vehicle,
    T: Tick,
{
    *phase = maneuver.phase();
    maneuver.fly(plane, config)
}

#[cfg(test)]
mod tests {
    use super::{Mission, MissionOutcome};
    use crate::{
        config::Config,
        error::Error,
        hal::Signal,
        plane::{
            maneuver::{Cruise, Direction, Phase, Turn},
            sim::{LinkDown, Script},
        },
    };

    const CENTER: f64 = -0.0493255;

    #[test]
    fn flies_to_a_stop() {
        let script = Script::default()
            .signal(Signal::Speed, |t| if t < 105 { t.min(60) as f64 } else { 0. })
            .signal(Signal::MeanAltitude, |t| 3. * t as f64)
            .signal(Signal::Longitude, |t| -80. + t as f64 / 16.)
            .signal(Signal::Latitude, |_| CENTER);
        let config = Config::default();
        let mut plane = script.plane();

        let mut mission = Mission::new(Cruise::new(-74., Direction::East));
        let outcome = mission.fly(&mut plane, &config).unwrap();

        assert_eq!(outcome, MissionOutcome::Landed { passes: 1 });
        assert_eq!(mission.phase(), Phase::Landed);
        assert_eq!(plane.vehicle.stages, 1);
        // Ground roll to 40, climb bootstrap to 45, cruise to 96, one pass to 106
        assert_eq!(script.now(), 106);
    }

    #[test]
    fn gives_up_when_the_plane_never_stops() {
        let script = Script::default()
            .signal(Signal::Speed, |_| 50.)
            .signal(Signal::MeanAltitude, |_| 150.)
            .signal(Signal::Longitude, |_| -70.)
            .signal(Signal::Heading, |_| 300.)
            .signal(Signal::Latitude, |_| CENTER);
        let config = Config::default();
        let mut plane = script.plane();

        let mut mission = Mission::default().with_turn(Turn::default());
        mission.max_passes = 3;
        let outcome = mission.fly(&mut plane, &config).unwrap();

        assert_eq!(outcome, MissionOutcome::Stalled { passes: 3 });
        assert_eq!(mission.phase(), Phase::Approach);
    }

    #[test]
    fn lost_link_aborts_the_mission() {
        let script = Script::default().fail_after(50);
        let config = Config::default();
        let mut plane = script.plane();

        let result = Mission::default().fly(&mut plane, &config);
        assert_eq!(result, Err(Error::Link(LinkDown)));
    }
}
