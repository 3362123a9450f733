//! Fixed-tick scheduling for the control loop.
//!
//! The derivative estimates assume a constant, known interval between samples, so every
//! maneuver suspends through a [`Tick`] between control steps instead of sleeping ad hoc.
//! [`FixedTick`] keeps the deadlines of consecutive ticks one period apart so that the loop
//! does not drift by the time it spends computing.

use crate::filter::Interval;
use embedded_time::{clock, duration::Microseconds, Clock, ConversionError};

/// Why a tick could not be paced.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// The clock could not be read.
    Clock(clock::Error),
    /// The clock reading does not fit in microseconds since its epoch.
    Time(ConversionError),
}

impl From<clock::Error> for Error {
    fn from(error: clock::Error) -> Self {
        Self::Clock(error)
    }
}

impl From<ConversionError> for Error {
    fn from(error: ConversionError) -> Self {
        Self::Time(error)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Clock(_) => defmt::write!(f, "clock unreadable"),
            Self::Time(_) => defmt::write!(f, "clock reading out of range"),
        }
    }
}

/// Suspends the control loop for one sampling interval.
pub trait Tick {
    /// Return once `period` has elapsed since the previous tick.
    fn tick(&mut self, period: Interval) -> Result<(), Error>;
}

/// A [`Tick`] that polls a clock until the next deadline.
pub struct FixedTick<C> {
    clock: C,
    deadline_us: Option<u32>,
    ticks: u32,
    overruns: u32,
}

impl<C> FixedTick<C>
where
    C: Clock<T = u32>,
{
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            deadline_us: None,
            ticks: 0,
            overruns: 0,
        }
    }

    /// The number of completed ticks.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// The number of ticks that started more than one full period late.
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    pub fn into_clock(self) -> C {
        self.clock
    }

    fn micros_since_epoch(&self) -> Result<Microseconds<u32>, Error> {
        let instant = self.clock.try_now()?;
        Microseconds::try_from(instant.duration_since_epoch()).map_err(Into::into)
    }
}

impl<C> Tick for FixedTick<C>
where
    C: Clock<T = u32>,
{
    fn tick(&mut self, period: Interval) -> Result<(), Error> {
        let period_us = period.micros();
        let now = self.micros_since_epoch()?.0;

        let mut deadline = match self.deadline_us {
            Some(last) => last.wrapping_add(period_us),
            None => now.wrapping_add(period_us),
        };

        if elapsed(now, deadline) > period_us as i64 {
            // Too far behind to keep the phase, start over from now
            self.overruns += 1;
            deadline = now;
        }

        while elapsed(self.micros_since_epoch()?.0, deadline) < 0 {}

        self.deadline_us = Some(deadline);
        self.ticks += 1;

        Ok(())
    }
}

/// Signed microseconds from `since` to `now` on a wrapping 32-bit clock.
fn elapsed(now: u32, since: u32) -> i64 {
    now.wrapping_sub(since) as i32 as i64
}

#[cfg(test)]
mod tests {
    use super::{Error, FixedTick, Tick};
    use crate::filter::Interval;
    use core::cell::Cell;
    use embedded_time::{clock, rate::Fraction, Clock, Instant};

    /// A clock that advances by `step` microseconds every time it is read.
    struct StepClock {
        now: Cell<u32>,
        step: u32,
    }

    impl StepClock {
        fn new(step: u32) -> Self {
            Self {
                now: Cell::new(0),
                step,
            }
        }
    }

    impl Clock for StepClock {
        type T = u32;

        const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

        fn try_now(&self) -> Result<Instant<Self>, clock::Error> {
            let now = self.now.get();
            self.now.set(now + self.step);
            Ok(Instant::new(now))
        }
    }

    struct StoppedClock;

    impl Clock for StoppedClock {
        type T = u32;

        const SCALING_FACTOR: Fraction = Fraction::new(1, 1_000_000);

        fn try_now(&self) -> Result<Instant<Self>, clock::Error> {
            Err(clock::Error::Unspecified)
        }
    }

    fn millisecond() -> Interval {
        Interval::new(0.001).unwrap()
    }

    #[test]
    fn ticks_stay_phase_correlated() {
        let mut ticker = FixedTick::new(StepClock::new(100));

        // Reads 0, then polls until 1000
        ticker.tick(millisecond()).unwrap();
        // Reads 1100 and polls until 2000, not 2100
        ticker.tick(millisecond()).unwrap();

        assert_eq!(ticker.ticks(), 2);
        assert_eq!(ticker.overruns(), 0);
        assert_eq!(ticker.into_clock().now.get(), 2100);
    }

    #[test]
    fn late_tick_reanchors_without_waiting() {
        let mut ticker = FixedTick::new(StepClock::new(5000));

        ticker.tick(millisecond()).unwrap();
        ticker.tick(millisecond()).unwrap();

        assert_eq!(ticker.overruns(), 1);
        // One read for `now` and one poll that is already past the deadline
        assert_eq!(ticker.into_clock().now.get(), 20_000);
    }

    #[test]
    fn clock_failure_is_reported() {
        let mut ticker = FixedTick::new(StoppedClock);
        let result = ticker.tick(millisecond());

        assert!(matches!(result, Err(Error::Clock(_))));
        assert_eq!(ticker.ticks(), 0);
    }
}
