use crate::filter::{DerivativeSeries, Interval};

/// The direction of an actuator correction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Correction {
    Increase,
    Decrease,
}

/// Decide whether a measured rate needs correcting toward `target`.
///
/// A correction is only made once the higher derivatives confirm the trend over four
/// samples: a rate above target whose second derivative turned positive while the third,
/// fourth and fifth are still negative is decreased, and the mirrored pattern is increased.
/// Any other pattern, or a series shorter than six levels, leaves the actuator alone.
pub fn rate_correction(series: &DerivativeSeries, target: f64) -> Option<Correction> {
    let &[rate, d2, d3, d4, d5] = series.as_slice().get(1..6)? else {
        return None;
    };

    if rate > target && d2 > 0. && d3 < 0. && d4 < 0. && d5 < 0. {
        Some(Correction::Decrease)
    } else if rate < target && d2 < 0. && d3 > 0. && d4 > 0. && d5 > 0. {
        Some(Correction::Increase)
    } else {
        None
    }
}

/// Magnitude of an actuator correction for a rate error.
///
/// Grows with the square of the rate error relative to the target and saturates at
/// `sensitivity * step`. A zero target saturates immediately.
pub fn quadratic_control(rate: f64, target: f64, step: f64, sensitivity: f64) -> f64 {
    let control = (rate - target) * (rate - target) * step / target / (target / sensitivity);

    // `min` discards the NaN of a zero target over a zero error
    control.abs().min(sensitivity * step)
}

/// A derivative-action regulator that drives an actuator from a position signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateController {
    /// Largest change (in actuator units) made per tick.
    pub step: f64,
    pub sensitivity: f64,
}

impl RateController {
    pub fn new(step: f64, sensitivity: f64) -> Self {
        Self { step, sensitivity }
    }

    /// The signed actuator change for this tick, if any.
    pub fn command(&self, series: &DerivativeSeries, target: f64) -> Option<f64> {
        let correction = rate_correction(series, target)?;
        let rate = series.rate()?;
        let control = quadratic_control(rate, target, self.step, self.sensitivity);

        Some(match correction {
            Correction::Increase => control,
            Correction::Decrease => -control,
        })
    }
}

/// Bang-bang throttle change for a quantity that should stay under `bound` without
/// rising faster than `rate_bound`.
pub fn throttle_step(
    current: f64,
    previous: f64,
    bound: f64,
    rate_bound: f64,
    interval: Interval,
    step: f64,
) -> f64 {
    let rate = (current - previous) / interval.seconds();
    if current < bound && rate < rate_bound {
        step
    } else {
        -step
    }
}
