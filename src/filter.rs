//! Finite-difference derivative estimation over a fixed sampling interval.

use crate::error::ConfigError;
use num_traits::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The most derivative levels (value included) a [`DerivativeSeries`] can hold.
pub const MAX_LEVELS: usize = 8;

/// The time (in seconds) between two consecutive samples of a signal.
///
/// At most [`Interval::MAX_SECONDS`], so that a period in microseconds stays within the
/// signed 32-bit window of the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "f64", into = "f64")
)]
pub struct Interval(pub(crate) f64);

impl Interval {
    /// The longest interval, about 35 minutes.
    pub const MAX_SECONDS: f64 = i32::MAX as f64 / 1e6;

    pub fn new(seconds: f64) -> Result<Self, ConfigError> {
        if !(seconds.is_finite() && seconds > 0.) {
            Err(ConfigError::NonPositiveInterval)
        } else if seconds > Self::MAX_SECONDS {
            Err(ConfigError::IntervalTooLong)
        } else {
            Ok(Self(seconds))
        }
    }

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// The interval rounded to whole microseconds.
    pub fn micros(self) -> u32 {
        Float::round(self.0 * 1e6) as u32
    }
}

impl TryFrom<f64> for Interval {
    type Error = ConfigError;

    fn try_from(seconds: f64) -> Result<Self, ConfigError> {
        Self::new(seconds)
    }
}

impl From<Interval> for f64 {
    fn from(interval: Interval) -> Self {
        interval.0
    }
}

/// A signal and its backward finite-difference derivatives.
///
/// Level 0 is the raw value and level `k` is the `k`th derivative with respect to time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DerivativeSeries {
    levels: [f64; MAX_LEVELS],
    len: usize,
}

impl Default for DerivativeSeries {
    fn default() -> Self {
        Self {
            levels: [0.; MAX_LEVELS],
            len: 0,
        }
    }
}

impl DerivativeSeries {
    /// Estimate the initial derivatives from consecutive samples taken `interval` apart.
    ///
    /// Each level is the per-step difference of the level below divided by the interval,
    /// down to the level with a single point. Levels are reported as the mean of all of their
    /// points to smooth out noise, so `n` samples give a series of length `n`.
    /// Only the latest [`MAX_LEVELS`] samples are used.
    pub fn from_samples(samples: &[f64], interval: Interval) -> Self {
        let n = samples.len().min(MAX_LEVELS);
        let mut points = [0.; MAX_LEVELS];
        points[..n].copy_from_slice(&samples[samples.len() - n..]);

        let mut series = Self::default();
        for level in 0..n {
            let count = n - level;
            series.push(mean(&points[..count]));

            for i in 0..count - 1 {
                points[i] = (points[i + 1] - points[i]) / interval.seconds();
            }
        }
        series
    }

    /// Step the series forward by one sample.
    ///
    /// The new sample becomes level 0 and every level above is the difference to the same
    /// level of `self`, so the result is one level longer (up to [`MAX_LEVELS`]).
    pub fn advance(&self, sample: f64, interval: Interval) -> Self {
        let mut next = Self::default();
        next.push(sample);

        for (level, previous) in self.as_slice().iter().enumerate() {
            if next.len == MAX_LEVELS {
                break;
            }
            next.push((next.levels[level] - previous) / interval.seconds());
        }
        next
    }

    /// Drop the highest derivative level.
    pub fn truncated(&self) -> Self {
        let mut series = *self;
        series.len = series.len.saturating_sub(1);
        series
    }

    pub fn get(&self, level: usize) -> Option<f64> {
        self.as_slice().get(level).copied()
    }

    /// The latest value of the signal.
    pub fn value(&self) -> Option<f64> {
        self.get(0)
    }

    /// The first derivative of the signal.
    pub fn rate(&self) -> Option<f64> {
        self.get(1)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.levels[..self.len]
    }

    fn push(&mut self, value: f64) {
        self.levels[self.len] = value;
        self.len += 1;
    }
}

impl From<&[f64]> for DerivativeSeries {
    /// Build a series from already computed levels, ignoring levels past [`MAX_LEVELS`].
    fn from(levels: &[f64]) -> Self {
        let mut series = Self::default();
        for &level in levels.iter().take(MAX_LEVELS) {
            series.push(level);
        }
        series
    }
}

fn mean(points: &[f64]) -> f64 {
    points.iter().sum::<f64>() / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::{DerivativeSeries, Interval, MAX_LEVELS};
    use crate::error::ConfigError;
    use approx::assert_abs_diff_eq;

    fn half_second() -> Interval {
        Interval::new(0.5).unwrap()
    }

    #[test]
    fn interval_must_be_positive() {
        assert_eq!(Interval::new(0.), Err(ConfigError::NonPositiveInterval));
        assert_eq!(Interval::new(-0.01), Err(ConfigError::NonPositiveInterval));
        assert_eq!(Interval::new(f64::NAN), Err(ConfigError::NonPositiveInterval));
        assert_eq!(Interval::new(0.005).unwrap().micros(), 5000);
    }

    #[test]
    fn interval_fits_the_scheduler_clock() {
        let longest = Interval::new(Interval::MAX_SECONDS).unwrap();
        assert_eq!(longest.micros(), i32::MAX as u32);

        assert_eq!(Interval::new(5000.), Err(ConfigError::IntervalTooLong));
        assert_eq!(Interval::try_from(0.25).map(f64::from), Ok(0.25));
    }

    #[test]
    fn constant_signal_has_no_derivatives() {
        let series = DerivativeSeries::from_samples(&[42.125; 5], Interval::new(0.01).unwrap());

        assert_eq!(series.len(), 5);
        assert_abs_diff_eq!(series.value().unwrap(), 42.125);
        for level in 1..series.len() {
            assert_abs_diff_eq!(series.get(level).unwrap(), 0., epsilon = 1e-9);
        }
    }

    #[test]
    fn bootstrap_reports_the_mean_of_each_level() {
        // x(t) = t^2 sampled every half second
        let samples = [0., 0.25, 1., 2.25, 4.];
        let series = DerivativeSeries::from_samples(&samples, half_second());

        // Differences: [0.5, 1.5, 2.5, 3.5], then [2, 2, 2], then zeros
        assert_eq!(series.as_slice(), &[1.5, 2., 2., 0., 0.]);
    }

    #[test]
    fn single_sample_stops_at_the_value() {
        let series = DerivativeSeries::from_samples(&[3.], half_second());
        assert_eq!(series.as_slice(), &[3.]);
        assert!(DerivativeSeries::from_samples(&[], half_second()).is_empty());
    }

    #[test]
    fn advance_differences_each_level() {
        let previous = DerivativeSeries::from(&[10., 2., 0.][..]);
        let next = previous.advance(11.5, half_second());

        // (11.5 - 10) / 0.5 = 3, (3 - 2) / 0.5 = 2, (2 - 0) / 0.5 = 4
        assert_eq!(next.as_slice(), &[11.5, 3., 2., 4.]);
        assert_eq!(next.truncated().as_slice(), &[11.5, 3., 2.]);
    }

    #[test]
    fn advance_on_a_ramp_keeps_higher_levels_flat() {
        let mut series = DerivativeSeries::from(&[4., 2., 0., 0., 0.][..]);

        for step in 5..10 {
            let next = series.advance(step as f64, half_second());
            assert_eq!(next.len(), 6);
            assert_eq!(next.rate(), Some(2.));
            series = next.truncated();
        }
        assert_eq!(series.as_slice(), &[9., 2., 0., 0., 0.]);
    }

    #[test]
    fn advance_is_capped() {
        let full = DerivativeSeries::from(&[1.; MAX_LEVELS + 2][..]);
        assert_eq!(full.len(), MAX_LEVELS);
        assert_eq!(full.advance(1., half_second()).len(), MAX_LEVELS);
        assert_eq!(full.get(MAX_LEVELS), None);
    }
}
