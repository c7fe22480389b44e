//! Shared rounding and clamping helpers.
//!
//! Amounts are rounded only where a figure leaves a component (a tax owed,
//! a deduction applied). Intermediate sums stay exact.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of a CHF amount (centimes).
pub const CURRENCY_DP: u32 = 2;

/// Decimal places kept on reported rates.
pub const RATE_DP: u32 = 6;

/// Rounds a decimal value to whole centimes using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use swisstax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a rate to [`RATE_DP`] places, half-up.
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(RATE_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `value`, or zero if it is negative.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use swisstax_core::calculations::common::floor_at_zero;
///
/// assert_eq!(floor_at_zero(dec!(150.00)), dec!(150.00));
/// assert_eq!(floor_at_zero(dec!(-150.00)), dec!(0));
/// ```
pub fn floor_at_zero(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Reduces `requested` to `cap`. Returns the allowed amount and whether it
/// was reduced.
pub fn clamp_to_cap(
    requested: Decimal,
    cap: Decimal,
) -> (Decimal, bool) {
    if requested > cap {
        (cap, true)
    } else {
        (requested, false)
    }
}
