//! Progressive bracket evaluation.
//!
//! Every portion of the amount that falls inside `[thresholdᵢ, thresholdᵢ₊₁)`
//! is taxed at `rateᵢ` and the portions are summed. The bracket that contains
//! the amount itself supplies the marginal rate. Sums are exact; the tax is
//! rounded to centimes once, after accumulation.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use swisstax_core::calculations::evaluate;
//! use swisstax_core::{Bracket, BracketSchedule, FilingMode, Jurisdiction, ScheduleKey};
//!
//! let schedule = BracketSchedule::new(
//!     ScheduleKey::income(Jurisdiction::Federal, 2025, FilingMode::Single),
//!     "",
//!     vec![
//!         Bracket::new(dec!(0), dec!(0)),
//!         Bracket::new(dec!(10000), dec!(0.05)),
//!         Bracket::new(dec!(50000), dec!(0.10)),
//!     ],
//! )
//! .unwrap();
//!
//! let evaluation = evaluate(&schedule, dec!(75000));
//!
//! // 40'000 at 5% plus 25'000 at 10%
//! assert_eq!(evaluation.tax, dec!(4500.00));
//! assert_eq!(evaluation.marginal_rate, dec!(0.10));
//! assert_eq!(evaluation.bracket_index, 2);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::BracketSchedule;
use crate::calculations::common::{floor_at_zero, round_half_up};

/// Outcome of evaluating one schedule at one amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub tax: Decimal,
    /// Rate applied to the next franc.
    pub marginal_rate: Decimal,
    /// Zero-based index of the bracket containing the amount.
    pub bracket_index: usize,
}

/// Evaluates `schedule` at `amount`, rounding the tax to centimes.
///
/// Non-positive amounts owe nothing and report the first bracket's rate.
pub fn evaluate(
    schedule: &BracketSchedule,
    amount: Decimal,
) -> Evaluation {
    let exact = evaluate_exact(schedule, amount);
    Evaluation {
        tax: round_half_up(exact.tax),
        ..exact
    }
}

/// Same as [`evaluate`] without the final rounding, for callers that scale
/// the tax before rounding it themselves.
pub fn evaluate_exact(
    schedule: &BracketSchedule,
    amount: Decimal,
) -> Evaluation {
    let amount = floor_at_zero(amount);
    let brackets = schedule.brackets();

    let mut tax = Decimal::ZERO;
    let mut reached = 0;

    for (index, bracket) in brackets.iter().enumerate() {
        if amount < bracket.threshold {
            break;
        }
        reached = index;

        let upper = schedule
            .upper_bound(index)
            .map_or(amount, |bound| bound.min(amount));
        tax += (upper - bracket.threshold) * bracket.rate;
    }

    Evaluation {
        tax,
        marginal_rate: brackets[reached].rate,
        bracket_index: reached,
    }
}

/// Evaluates a married income under rate splitting: the rate is the one of
/// `amount / divisor` and it applies to the full amount.
///
/// Equivalent to `divisor × T(amount / divisor)`; the marginal rate is that
/// of the divided amount. A divisor of 1 is a plain evaluation.
pub fn evaluate_split(
    schedule: &BracketSchedule,
    amount: Decimal,
    divisor: Decimal,
) -> Evaluation {
    if divisor <= Decimal::ONE {
        return evaluate(schedule, amount);
    }

    let share = evaluate_exact(schedule, floor_at_zero(amount) / divisor);
    Evaluation {
        tax: round_half_up(share.tax * divisor),
        ..share
    }
}
