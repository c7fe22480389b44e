use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{FilingMode, Jurisdiction, TaxBase};
use crate::TaxError;

/// One progressive bracket: `rate` applies from `threshold` (inclusive) up to
/// the next bracket's threshold (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub threshold: Decimal,
    pub rate: Decimal,
}

impl Bracket {
    pub fn new(
        threshold: Decimal,
        rate: Decimal,
    ) -> Self {
        Self { threshold, rate }
    }
}

/// Lookup key of a schedule in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleKey {
    pub jurisdiction: Jurisdiction,
    pub base: TaxBase,
    pub year: i32,
    pub filing_mode: FilingMode,
}

impl ScheduleKey {
    pub fn new(
        jurisdiction: Jurisdiction,
        base: TaxBase,
        year: i32,
        filing_mode: FilingMode,
    ) -> Self {
        Self {
            jurisdiction,
            base,
            year,
            filing_mode,
        }
    }

    pub fn income(
        jurisdiction: Jurisdiction,
        year: i32,
        filing_mode: FilingMode,
    ) -> Self {
        Self::new(jurisdiction, TaxBase::Income, year, filing_mode)
    }

    pub fn wealth(
        jurisdiction: Jurisdiction,
        year: i32,
        filing_mode: FilingMode,
    ) -> Self {
        Self::new(jurisdiction, TaxBase::Wealth, year, filing_mode)
    }
}

impl fmt::Display for ScheduleKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.jurisdiction, self.base, self.year, self.filing_mode
        )
    }
}

/// A validated progressive rate table.
///
/// The only way to obtain one is [`BracketSchedule::new`], so every instance
/// satisfies the schedule invariants:
///
/// - at least one bracket, the first starting at 0
/// - thresholds strictly increasing
/// - rates within `[0, 1]` and non-decreasing
///
/// The last bracket is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BracketSchedule {
    key: ScheduleKey,
    label: String,
    brackets: Vec<Bracket>,
}

impl BracketSchedule {
    /// Validates `brackets` and builds the schedule.
    ///
    /// An empty `label` is replaced by the key's display form.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidBracketSchedule`] naming the first
    /// violated invariant.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use swisstax_core::{Bracket, BracketSchedule, FilingMode, Jurisdiction, ScheduleKey};
    ///
    /// let key = ScheduleKey::income(Jurisdiction::Federal, 2025, FilingMode::Single);
    /// let schedule = BracketSchedule::new(
    ///     key,
    ///     "",
    ///     vec![
    ///         Bracket::new(dec!(0), dec!(0)),
    ///         Bracket::new(dec!(15000), dec!(0.01)),
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(schedule.label(), "CH income 2025 single");
    /// assert_eq!(schedule.top_rate(), dec!(0.01));
    /// ```
    pub fn new(
        key: ScheduleKey,
        label: impl Into<String>,
        brackets: Vec<Bracket>,
    ) -> Result<Self, TaxError> {
        let label = label.into();
        let label = if label.trim().is_empty() {
            key.to_string()
        } else {
            label
        };

        validate_brackets(&brackets).map_err(|reason| TaxError::InvalidBracketSchedule {
            label: label.clone(),
            reason,
        })?;

        Ok(Self {
            key,
            label,
            brackets,
        })
    }

    pub fn key(&self) -> &ScheduleKey {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn year(&self) -> i32 {
        self.key.year
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.brackets
    }

    /// Upper bound (exclusive) of the bracket at `index`, `None` for the
    /// open-ended top bracket.
    pub fn upper_bound(
        &self,
        index: usize,
    ) -> Option<Decimal> {
        self.brackets.get(index + 1).map(|b| b.threshold)
    }

    pub fn top_rate(&self) -> Decimal {
        // Non-empty by construction.
        self.brackets.last().map_or(Decimal::ZERO, |b| b.rate)
    }
}

fn validate_brackets(brackets: &[Bracket]) -> Result<(), String> {
    let first = brackets
        .first()
        .ok_or_else(|| "schedule has no brackets".to_string())?;

    if first.threshold != Decimal::ZERO {
        return Err(format!(
            "first threshold must be 0, got {}",
            first.threshold
        ));
    }

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return Err(format!(
                "rate {} of bracket {index} is outside [0, 1]",
                bracket.rate
            ));
        }
    }

    for (index, pair) in brackets.windows(2).enumerate() {
        let (lower, upper) = (&pair[0], &pair[1]);
        if upper.threshold <= lower.threshold {
            return Err(format!(
                "threshold {} of bracket {} does not exceed {}",
                upper.threshold,
                index + 1,
                lower.threshold
            ));
        }
        if upper.rate < lower.rate {
            return Err(format!(
                "rate {} of bracket {} is lower than {}",
                upper.rate,
                index + 1,
                lower.rate
            ));
        }
    }

    Ok(())
}
