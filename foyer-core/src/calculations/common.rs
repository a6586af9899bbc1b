//! Common utility functions for tax calculations.
//!
//! This module provides the rounding and clamping rules shared by every
//! calculator: whole-unit rounding for tax figures and two-decimal rounding
//! for display ratios.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to the nearest whole currency unit.
///
/// Midpoints go toward positive infinity, so `2.5` becomes `3` and `-2.5`
/// becomes `-2`. Negative results that round to zero are returned as a plain
/// zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use foyer_core::calculations::common::round_to_unit;
///
/// assert_eq!(round_to_unit(dec!(3680.16)), dec!(3680));
/// assert_eq!(round_to_unit(dec!(1226.5)), dec!(1227));
/// assert_eq!(round_to_unit(dec!(-2.5)), dec!(-2));
/// assert_eq!(round_to_unit(dec!(-2.6)), dec!(-3));
/// ```
pub fn round_to_unit(value: Decimal) -> Decimal {
    let strategy = if value.is_sign_negative() {
        RoundingStrategy::MidpointTowardZero
    } else {
        RoundingStrategy::MidpointAwayFromZero
    };
    let rounded = value.round_dp_with_strategy(0, strategy);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use foyer_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(33.334)), dec!(33.33));
/// assert_eq!(round_half_up(dec!(33.335)), dec!(33.34));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamps a value to zero from below.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}
