//! Cantonal and communal wealth tax.
//!
//! The cantonal wealth schedule is evaluated on taxable wealth (net wealth
//! after the personal exemption) and the commune levies the same
//! coefficient it applies to income tax. There is no federal wealth tax.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::round_half_up;
use crate::calculations::progressive::evaluate;
use crate::{BracketSchedule, FilingMode, Jurisdiction, JurisdictionConfig, TaxBase, TaxError};

/// Wealth tax owed, in CHF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WealthTax {
    pub cantonal: Decimal,
    pub communal: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone)]
pub struct WealthTaxEvaluator<'a> {
    schedule: Option<&'a BracketSchedule>,
    config: &'a JurisdictionConfig,
}

impl<'a> WealthTaxEvaluator<'a> {
    /// Pairs a canton's config with its wealth schedule for `filing_mode`.
    ///
    /// A canton that does not levy wealth tax needs no schedule; one given
    /// anyway is ignored.
    ///
    /// # Errors
    ///
    /// * [`TaxError::MissingScheduleForYear`]: the canton levies wealth tax
    ///   and `schedule` is `None`.
    /// * [`TaxError::InvalidConfig`]: the schedule is not a wealth schedule
    ///   of the configured canton.
    /// * [`TaxError::IncompatibleJurisdictionConfig`]: config and schedule
    ///   years differ.
    pub fn new(
        config: &'a JurisdictionConfig,
        schedule: Option<&'a BracketSchedule>,
        filing_mode: FilingMode,
    ) -> Result<Self, TaxError> {
        if !config.levies_wealth_tax {
            return Ok(Self {
                schedule: None,
                config,
            });
        }

        let jurisdiction = Jurisdiction::Canton(config.canton);
        let schedule = schedule.ok_or(TaxError::MissingScheduleForYear {
            jurisdiction,
            base: TaxBase::Wealth,
            year: config.tax_year,
            filing_mode,
        })?;

        let key = schedule.key();
        if key.jurisdiction != jurisdiction || key.base != TaxBase::Wealth {
            return Err(TaxError::InvalidConfig(format!(
                "schedule '{}' is not a {} wealth schedule",
                schedule.label(),
                config.canton
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

        Ok(Self {
            schedule: Some(schedule),
            config,
        })
    }

    pub fn evaluate(
        &self,
        taxable_wealth: Decimal,
    ) -> WealthTax {
        let Some(schedule) = self.schedule else {
            debug!(canton = %self.config.canton, "canton levies no wealth tax");
            return WealthTax::default();
        };

        let cantonal = evaluate(schedule, taxable_wealth).tax;
        let communal = round_half_up(cantonal * self.config.communal_coefficient);

        WealthTax {
            cantonal,
            communal,
            total: cantonal + communal,
        }
    }
}
