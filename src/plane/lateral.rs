//! Lateral alignment with the runway centerline.
//!
//! A vehicle flying parallel to the runway but off its centerline joins it with an S-turn:
//! bank toward the centerline until the heading leaves a window around the runway heading,
//! level the wings, counter-bank back onto the runway heading as the centerline gets close,
//! then level the wings again and release. The same decision applies on both sides of the
//! centerline with the bank and heading comparisons mirrored.

use crate::config::Runway;
use num_traits::Float;

/// Which side of the centerline the vehicle is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    /// At a greater latitude than the centerline.
    North,
    /// At a lower (or equal) latitude than the centerline.
    South,
}

impl Side {
    pub fn of(latitude: f64, center_latitude: f64) -> Self {
        if latitude > center_latitude {
            Side::North
        } else {
            Side::South
        }
    }

    /// The sign of the first bank of the S-turn, toward the centerline.
    pub fn bank_sign(self) -> f64 {
        match self {
            Side::North => -1.,
            Side::South => 1.,
        }
    }

    /// Returns `true` while the vehicle has not yet crossed the centerline.
    pub fn is_outside(self, latitude: f64, center_latitude: f64) -> bool {
        match self {
            Side::North => latitude > center_latitude,
            Side::South => latitude < center_latitude,
        }
    }

    /// Returns `true` if `latitude` is further from the centerline than `other`.
    fn is_further(self, latitude: f64, other: f64) -> bool {
        match self {
            Side::North => latitude > other,
            Side::South => latitude < other,
        }
    }
}

/// The stage of the S-turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LateralMode {
    /// Far from the centerline with the heading still inside the window: bank toward it.
    BankIn,
    /// Far from the centerline with the heading out of the window: wings level.
    Level,
    /// Closing in, but not yet close enough to reverse: wings level.
    Hold,
    /// Close to the centerline with the heading out of the window: counter-bank.
    Reverse,
    /// Close to the centerline and back inside the window: wings level, then release.
    Release,
    /// Exactly on the reversal boundary: no roll command.
    Coast,
}

impl LateralMode {
    /// The bank angle to hold, or `None` when the roll rate should simply be zero.
    pub fn roll_setpoint(self, side: Side, correction_roll: f64) -> Option<f64> {
        match self {
            LateralMode::BankIn => Some(side.bank_sign() * correction_roll),
            LateralMode::Reverse => Some(-side.bank_sign() * correction_roll),
            LateralMode::Level | LateralMode::Hold | LateralMode::Release => Some(0.),
            LateralMode::Coast => None,
        }
    }
}

/// Progress above which the vehicle is still far from the centerline.
pub const FAR_PROGRESS: f64 = 0.75;

/// Multiple of the bank-in progress at which the counter-bank starts.
pub const REVERSE_FACTOR: f64 = 8.;

/// Select the S-turn stage.
///
/// `di` is the remaining fraction of the initial distance to the centerline (1 at the
/// widest point, 0 on the centerline) and `half_turn_di` the progress made during the
/// bank-in. A heading exactly on the window edge counts as out of the window, so every
/// input maps to exactly one stage.
pub fn lateral_mode(
    heading: f64,
    di: f64,
    half_turn_di: f64,
    side: Side,
    runway_heading: f64,
    correction_angle: f64,
) -> LateralMode {
    let edge = runway_heading + side.bank_sign() * correction_angle / 2.;
    let out_of_window = match side {
        Side::North => heading <= edge,
        Side::South => heading >= edge,
    };
    let reverse_at = REVERSE_FACTOR * half_turn_di;

    if di > FAR_PROGRESS {
        if out_of_window {
            LateralMode::Level
        } else {
            LateralMode::BankIn
        }
    } else if di > reverse_at {
        LateralMode::Hold
    } else if di < reverse_at {
        if out_of_window {
            LateralMode::Reverse
        } else {
            LateralMode::Release
        }
    } else {
        LateralMode::Coast
    }
}

/// Working state of the S-turn for one approach.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Alignment {
    pub side: Side,
    /// Bank angle (in degrees) of both turns of the S.
    pub correction_roll: f64,
    /// The furthest latitude from the centerline seen so far.
    pub initial_latitude: f64,
    pub half_turn_di: f64,
    pub mode: LateralMode,
}

impl Alignment {
    /// Start an alignment from the current latitude.
    ///
    /// The correction roll is proportional to the distance from the centerline, with a
    /// smaller minimum once the vehicle is already past the runway threshold.
    pub fn new(latitude: f64, past_threshold: bool, runway: &Runway) -> Self {
        let min_roll = if past_threshold {
            runway.near_min_correction_roll
        } else {
            runway.min_correction_roll
        };
        let correction_roll = (runway.correction_roll_gain
            * (runway.center_latitude - latitude).abs())
        .max(min_roll)
        .min(runway.max_correction_roll);

        Self {
            side: Side::of(latitude, runway.center_latitude),
            correction_roll,
            initial_latitude: latitude,
            half_turn_di: 0.25,
            mode: LateralMode::BankIn,
        }
    }

    /// The remaining fraction of the distance to the centerline.
    pub fn progress(&mut self, latitude: f64, center_latitude: f64) -> f64 {
        if self.side.is_further(latitude, self.initial_latitude) {
            self.initial_latitude = latitude;
        }
        (center_latitude - latitude) / (center_latitude - self.initial_latitude)
    }

    /// Advance the S-turn with the current heading and latitude and return its stage.
    pub fn update(
        &mut self,
        heading: f64,
        latitude: f64,
        runway: &Runway,
        correction_angle: f64,
    ) -> LateralMode {
        let di = self.progress(latitude, runway.center_latitude);
        let mode = lateral_mode(
            heading,
            di,
            self.half_turn_di,
            self.side,
            runway.heading,
            correction_angle,
        );

        if mode == LateralMode::BankIn {
            self.half_turn_di = 1. - di;
        }
        if mode != self.mode {
            debug!("lateral mode {} at di {}", mode, di);
        }
        self.mode = mode;
        mode
    }
}

#[cfg(test)]
mod tests {
    use super::{lateral_mode, Alignment, LateralMode, Side};
    use crate::config::Config;
    use approx::assert_relative_eq;

    const RUNWAY_HEADING: f64 = 270.;
    const CORRECTION_ANGLE: f64 = 40.;

    fn north(heading: f64, di: f64, half_turn_di: f64) -> LateralMode {
        lateral_mode(heading, di, half_turn_di, Side::North, RUNWAY_HEADING, CORRECTION_ANGLE)
    }

    fn south(heading: f64, di: f64, half_turn_di: f64) -> LateralMode {
        lateral_mode(heading, di, half_turn_di, Side::South, RUNWAY_HEADING, CORRECTION_ANGLE)
    }

    #[test]
    fn window_edge_levels_the_wings() {
        assert_eq!(north(250., 0.8, 0.25), LateralMode::Level);
        assert_eq!(south(290., 0.8, 0.25), LateralMode::Level);
    }

    #[test]
    fn north_side_sequence() {
        assert_eq!(north(270., 1., 0.25), LateralMode::BankIn);
        assert_eq!(north(245., 0.9, 0.05), LateralMode::Level);
        assert_eq!(north(245., 0.6, 0.05), LateralMode::Hold);
        assert_eq!(north(245., 0.3, 0.05), LateralMode::Reverse);
        assert_eq!(north(260., 0.3, 0.05), LateralMode::Release);
        assert_eq!(north(260., 0.4, 0.05), LateralMode::Coast);
    }

    #[test]
    fn south_side_mirrors_north() {
        assert_eq!(south(270., 1., 0.25), LateralMode::BankIn);
        assert_eq!(south(295., 0.9, 0.05), LateralMode::Level);
        assert_eq!(south(295., 0.6, 0.05), LateralMode::Hold);
        assert_eq!(south(295., 0.3, 0.05), LateralMode::Reverse);
        assert_eq!(south(280., 0.3, 0.05), LateralMode::Release);
    }

    #[test]
    fn far_progress_boundary_is_not_far() {
        // di == 0.75 falls through to the closing stages
        assert_eq!(north(270., 0.75, 0.25), LateralMode::Release);
        assert_eq!(north(240., 0.75, 0.25), LateralMode::Reverse);
        assert_eq!(north(240., 0.75, 0.05), LateralMode::Hold);
    }

    #[test]
    fn setpoints_mirror_by_side() {
        assert_eq!(LateralMode::BankIn.roll_setpoint(Side::North, 10.), Some(-10.));
        assert_eq!(LateralMode::BankIn.roll_setpoint(Side::South, 10.), Some(10.));
        assert_eq!(LateralMode::Reverse.roll_setpoint(Side::North, 10.), Some(10.));
        assert_eq!(LateralMode::Level.roll_setpoint(Side::North, 10.), Some(0.));
        assert_eq!(LateralMode::Coast.roll_setpoint(Side::South, 10.), None);
    }

    #[test]
    fn correction_roll_is_bounded() {
        let runway = Config::default().runway;

        // 200 * 0.01 = 2, raised to the minimum
        let close = Alignment::new(runway.center_latitude + 0.01, false, &runway);
        assert_eq!(close.correction_roll, 5.);
        assert_eq!(close.side, Side::North);

        let past = Alignment::new(runway.center_latitude + 0.01, true, &runway);
        assert_relative_eq!(past.correction_roll, 2., max_relative = 1e-9);

        let far = Alignment::new(runway.center_latitude - 0.5, false, &runway);
        assert_eq!(far.correction_roll, 15.);
        assert_eq!(far.side, Side::South);
    }

    #[test]
    fn progress_tracks_the_widest_point() {
        let runway = Config::default().runway;
        let center = runway.center_latitude;
        let mut alignment = Alignment::new(center + 0.04, false, &runway);

        assert_relative_eq!(alignment.progress(center + 0.04, center), 1.);
        // Drifting further away moves the reference
        assert_relative_eq!(alignment.progress(center + 0.08, center), 1.);
        assert_relative_eq!(alignment.progress(center + 0.02, center), 0.25, max_relative = 1e-9);
    }

    #[test]
    fn bank_in_records_its_progress() {
        let runway = Config::default().runway;
        let center = runway.center_latitude;
        let mut alignment = Alignment::new(center + 0.1, false, &runway);

        assert_eq!(alignment.update(270., center + 0.09, &runway, 40.), LateralMode::BankIn);
        assert_relative_eq!(alignment.half_turn_di, 0.1, max_relative = 1e-9);

        assert_eq!(alignment.update(245., center + 0.085, &runway, 40.), LateralMode::Level);
        assert_relative_eq!(alignment.half_turn_di, 0.1, max_relative = 1e-9);
    }
}
