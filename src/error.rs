use crate::scheduler;
use core::fmt;

/// A tuning constant or planner input that makes the control math undefined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The sampling interval must be finite and greater than zero.
    NonPositiveInterval,
    /// The sampling interval must fit the signed 32-bit microsecond clock of the scheduler.
    IntervalTooLong,
    /// The actuator step must be finite and greater than zero.
    NonPositiveControlStep,
    /// The asymmetric quadratic planner divides by its midpoint.
    ZeroMidpoint,
    /// A turn needs its heading limit to differ from the initial heading.
    EmptyHeadingSpan,
    /// A lower bound is greater than its upper bound.
    InvertedBounds,
    /// The rate controllers need five derivatives after each advance, and a bootstrap holds
    /// at most [`MAX_LEVELS`](crate::filter::MAX_LEVELS) levels.
    UnsupportedDerivativeOrder,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::NonPositiveInterval => "sampling interval must be positive",
            ConfigError::IntervalTooLong => "sampling interval is too long for the scheduler",
            ConfigError::NonPositiveControlStep => "control step must be positive",
            ConfigError::ZeroMidpoint => "quadratic planner midpoint must be non-zero",
            ConfigError::EmptyHeadingSpan => "turn heading limit equals the initial heading",
            ConfigError::InvertedBounds => "lower bound is greater than upper bound",
            ConfigError::UnsupportedDerivativeOrder => "unsupported derivative order",
        };
        f.write_str(msg)
    }
}

/// An error that aborts a maneuver.
#[derive(Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    Config(ConfigError),
    Scheduler(scheduler::Error),
    /// The link to the vehicle was lost.
    Link(E),
}

impl<E> From<ConfigError> for Error<E> {
    fn from(config_error: ConfigError) -> Self {
        Error::Config(config_error)
    }
}

impl<E> From<scheduler::Error> for Error<E> {
    fn from(scheduler_error: scheduler::Error) -> Self {
        Error::Scheduler(scheduler_error)
    }
}
