use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Canton, FilingMode};
use crate::TaxError;

/// Church membership declared by the taxpayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confession {
    #[default]
    None,
    Reformed,
    RomanCatholic,
    ChristCatholic,
}

impl Confession {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Church tax coefficients, each a multiplier on the cantonal simple tax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfessionalRates {
    pub reformed: Decimal,
    pub roman_catholic: Decimal,
    pub christ_catholic: Decimal,
}

impl ConfessionalRates {
    pub fn rate_for(
        &self,
        confession: Confession,
    ) -> Decimal {
        match confession {
            Confession::None => Decimal::ZERO,
            Confession::Reformed => self.reformed,
            Confession::RomanCatholic => self.roman_catholic,
            Confession::ChristCatholic => self.christ_catholic,
        }
    }
}

/// Per-canton configuration for one tax year.
///
/// The communal coefficient is the one of the canton's reference commune
/// (usually the capital).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionConfig {
    pub canton: Canton,
    pub tax_year: i32,
    pub label: String,

    /// Multiplier on the cantonal simple tax levied by the commune.
    pub communal_coefficient: Decimal,

    pub confessional_rates: ConfessionalRates,

    /// Whether the canton has a wealth-tax schedule for this year.
    pub levies_wealth_tax: bool,

    pub wealth_exemption_single: Decimal,
    pub wealth_exemption_married: Decimal,
    pub wealth_exemption_per_child: Decimal,

    /// Divisor applied to married income to find the cantonal rate. `None`
    /// means the canton has a dedicated married schedule.
    pub splitting_divisor: Option<Decimal>,
}

impl JurisdictionConfig {
    const MAX_COMMUNAL_COEFFICIENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);
    const MAX_SPLITTING_DIVISOR: Decimal = Decimal::TWO;

    /// Checks every coefficient and amount is within its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidConfig`] describing the first offending
    /// field.
    pub fn validate(&self) -> Result<(), TaxError> {
        let invalid = |what: String| Err(TaxError::InvalidConfig(format!("{}: {what}", self.label)));

        if self.communal_coefficient < Decimal::ZERO
            || self.communal_coefficient > Self::MAX_COMMUNAL_COEFFICIENT
        {
            return invalid(format!(
                "communal coefficient {} is outside [0, {}]",
                self.communal_coefficient,
                Self::MAX_COMMUNAL_COEFFICIENT
            ));
        }

        let rates = &self.confessional_rates;
        for (name, rate) in [
            ("reformed", rates.reformed),
            ("roman catholic", rates.roman_catholic),
            ("christ catholic", rates.christ_catholic),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return invalid(format!("{name} rate {rate} is outside [0, 1]"));
            }
        }

        for (name, amount) in [
            ("single wealth exemption", self.wealth_exemption_single),
            ("married wealth exemption", self.wealth_exemption_married),
            ("per-child wealth exemption", self.wealth_exemption_per_child),
        ] {
            if amount < Decimal::ZERO {
                return invalid(format!("{name} {amount} is negative"));
            }
        }

        if let Some(divisor) = self.splitting_divisor {
            if divisor < Decimal::ONE || divisor > Self::MAX_SPLITTING_DIVISOR {
                return invalid(format!(
                    "splitting divisor {divisor} is outside [1, {}]",
                    Self::MAX_SPLITTING_DIVISOR
                ));
            }
        }

        Ok(())
    }

    pub fn confessional_rate(
        &self,
        confession: Confession,
    ) -> Decimal {
        self.confessional_rates.rate_for(confession)
    }

    /// Personal wealth exemption for the filing mode, including the
    /// per-child addition.
    pub fn wealth_exemption(
        &self,
        filing_mode: FilingMode,
        children: u32,
    ) -> Decimal {
        let base = match filing_mode {
            FilingMode::Single => self.wealth_exemption_single,
            FilingMode::Married => self.wealth_exemption_married,
        };
        base + self.wealth_exemption_per_child * Decimal::from(children)
    }

    /// The filing mode whose cantonal income schedule applies to a profile
    /// filed under `filing_mode`.
    pub fn cantonal_income_mode(
        &self,
        filing_mode: FilingMode,
    ) -> FilingMode {
        match (filing_mode, self.splitting_divisor) {
            (FilingMode::Married, Some(_)) => FilingMode::Single,
            (mode, _) => mode,
        }
    }
}
