//! Combines federal and cantonal income tax with the communal and
//! confessional surcharges and the wealth tax.
//!
//! | Figure | Computation |
//! |--------|-------------|
//! | Federal | federal schedule at taxable income |
//! | Cantonal | cantonal simple tax: cantonal schedule at taxable income, split if the canton splits |
//! | Communal | cantonal × communal coefficient |
//! | Confessional | cantonal × confessional rate (0 without a recognized confession) |
//! | Total | federal + cantonal + communal + confessional + wealth |
//! | Effective rate | total ÷ gross income (0 when gross income is 0) |
//! | Marginal rate | federal marginal + cantonal marginal × (1 + coefficient + confessional rate) |

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{round_half_up, round_rate};
use crate::calculations::progressive::{Evaluation, evaluate, evaluate_split};
use crate::calculations::wealth::WealthTax;
use crate::{
    BracketSchedule, Confession, FilingMode, Jurisdiction, JurisdictionConfig, TaxBase, TaxError,
};

/// Bases the composer works on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionInput {
    pub taxable_income: Decimal,
    pub gross_income: Decimal,
    pub filing_mode: FilingMode,
    pub confession: Confession,
    pub wealth: WealthTax,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub federal: Evaluation,
    /// Cantonal simple tax.
    pub cantonal: Evaluation,
    pub communal: Decimal,
    pub confessional: Decimal,
    pub wealth: WealthTax,
    pub total: Decimal,
    pub effective_rate: Decimal,
    pub marginal_rate: Decimal,
    pub schedule_label: String,
    pub communal_coefficient: Decimal,
}

/// One canton's income schedules and config for one tax year.
#[derive(Debug, Clone)]
pub struct JurisdictionComposer<'a> {
    federal: &'a BracketSchedule,
    cantonal: &'a BracketSchedule,
    config: &'a JurisdictionConfig,
}

impl<'a> JurisdictionComposer<'a> {
    /// # Errors
    ///
    /// * [`TaxError::InvalidConfig`]: `federal` is not a federal income
    ///   schedule, or `cantonal` is not an income schedule of the configured
    ///   canton.
    /// * [`TaxError::IncompatibleJurisdictionConfig`]: a schedule's year
    ///   differs from the config's.
    pub fn new(
        federal: &'a BracketSchedule,
        cantonal: &'a BracketSchedule,
        config: &'a JurisdictionConfig,
    ) -> Result<Self, TaxError> {
        Self::check_schedule(federal, Jurisdiction::Federal, config)?;
        Self::check_schedule(cantonal, Jurisdiction::Canton(config.canton), config)?;

        Ok(Self {
            federal,
            cantonal,
            config,
        })
    }

    fn check_schedule(
        schedule: &BracketSchedule,
        jurisdiction: Jurisdiction,
        config: &JurisdictionConfig,
    ) -> Result<(), TaxError> {
        let key = schedule.key();
        if key.jurisdiction != jurisdiction || key.base != TaxBase::Income {
            return Err(TaxError::InvalidConfig(format!(
                "schedule '{}' is not a {jurisdiction} income schedule",
                schedule.label()
            )));
        }
        if schedule.year() != config.tax_year {
            return Err(TaxError::IncompatibleJurisdictionConfig {
                canton: config.canton,
                config_year: config.tax_year,
                schedule_label: schedule.label().to_string(),
                schedule_year: schedule.year(),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// [`TaxError::InvalidConfig`] if a schedule's filing mode does not fit
    /// `input.filing_mode`: the federal schedule must match it, the cantonal
    /// one must match [`JurisdictionConfig::cantonal_income_mode`].
    pub fn compose(
        &self,
        input: &CompositionInput,
    ) -> Result<Composition, TaxError> {
        self.check_filing_mode(self.federal, input.filing_mode)?;
        self.check_filing_mode(self.cantonal, self.config.cantonal_income_mode(input.filing_mode))?;

        let federal = evaluate(self.federal, input.taxable_income);
        let cantonal = self.cantonal_simple_tax(input);

        let coefficient = self.config.communal_coefficient;
        let confessional_rate = if input.confession.is_recognized() {
            self.config.confessional_rate(input.confession)
        } else {
            Decimal::ZERO
        };

        let communal = round_half_up(cantonal.tax * coefficient);
        let confessional = round_half_up(cantonal.tax * confessional_rate);
        let total = federal.tax + cantonal.tax + communal + confessional + input.wealth.total;

        let effective_rate = self.effective_rate(total, input.gross_income);
        let marginal_rate = round_rate(
            federal.marginal_rate
                + cantonal.marginal_rate * (Decimal::ONE + coefficient + confessional_rate),
        );

        debug!(
            canton = %self.config.canton,
            federal = %federal.tax,
            cantonal = %cantonal.tax,
            communal = %communal,
            confessional = %confessional,
            wealth = %input.wealth.total,
            total = %total,
            "taxes composed"
        );

        Ok(Composition {
            federal,
            cantonal,
            communal,
            confessional,
            wealth: input.wealth,
            total,
            effective_rate,
            marginal_rate,
            schedule_label: self.cantonal.label().to_string(),
            communal_coefficient: coefficient,
        })
    }

    fn check_filing_mode(
        &self,
        schedule: &BracketSchedule,
        expected: FilingMode,
    ) -> Result<(), TaxError> {
        if schedule.key().filing_mode == expected {
            Ok(())
        } else {
            Err(TaxError::InvalidConfig(format!(
                "schedule '{}' does not apply to {expected} filers",
                schedule.label()
            )))
        }
    }

    fn cantonal_simple_tax(
        &self,
        input: &CompositionInput,
    ) -> Evaluation {
        match (input.filing_mode, self.config.splitting_divisor) {
            (FilingMode::Married, Some(divisor)) => {
                evaluate_split(self.cantonal, input.taxable_income, divisor)
            }
            _ => evaluate(self.cantonal, input.taxable_income),
        }
    }

    fn effective_rate(
        &self,
        total: Decimal,
        gross_income: Decimal,
    ) -> Decimal {
        if gross_income <= Decimal::ZERO {
            Decimal::ZERO
        } else {
            round_rate(total / gross_income)
        }
    }
}
