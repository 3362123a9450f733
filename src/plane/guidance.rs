//! Target rates from setpoints.
//!
//! The further a signal is from its setpoint, the faster it should move toward it. The
//! relation is quadratic and saturates, so corrections are gentle close to the setpoint and
//! aggressive far from it.

use crate::error::ConfigError;
use num_traits::Float;

/// Target rate for a signal tracking an absolute setpoint such as an altitude or a speed.
///
/// The quadratic is scaled by the midpoint itself, so a zero midpoint is rejected.
/// The result lies within `sensitivity * bound` of zero.
pub fn quadratic_target_rate(
    value: f64,
    midpoint: f64,
    bound: f64,
    sensitivity: f64,
) -> Result<f64, ConfigError> {
    if midpoint == 0. {
        return Err(ConfigError::ZeroMidpoint);
    }

    let mut target = (value - midpoint).powi(2) * bound / midpoint / (midpoint / sensitivity);
    if value > midpoint {
        target = -target;
    }

    let limit = (sensitivity * bound).abs();
    Ok(target.max(-limit).min(limit))
}

/// Target rate for a signal whose setpoint may be zero, such as the roll angle.
///
/// The result is antisymmetric about the midpoint and lies within `bound` of zero.
pub fn symmetric_target_rate(value: f64, midpoint: f64, bound: f64, anti_sensitivity: f64) -> f64 {
    let mut target = (value - midpoint).powi(2) * bound / anti_sensitivity;
    if value > midpoint {
        target = -target;
    }

    let limit = bound.abs();
    target.max(-limit).min(limit)
}

/// Bank angle (in degrees) for a turn from `initial` to `limit` heading.
///
/// The bank eases out along an inverse cubic of the heading progress, shifted by `offset`
/// degrees, and stays at `max_roll` while the heading is still behind `initial`.
pub fn roll_from_heading(
    heading: f64,
    initial: f64,
    limit: f64,
    max_roll: f64,
    offset: f64,
) -> Result<f64, ConfigError> {
    if heading < initial {
        return Ok(max_roll);
    }

    let span = limit - initial;
    if span == 0. {
        return Err(ConfigError::EmptyHeadingSpan);
    }

    Ok(-max_roll / span.powi(3) * (heading - initial - offset).powi(3) + max_roll)
}
