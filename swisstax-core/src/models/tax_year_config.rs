use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::TaxError;

/// Statutory deduction limits for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearConfig {
    pub tax_year: i32,

    /// Pillar 3a maximum for taxpayers affiliated with an employer pension
    /// fund.
    pub pillar3a_cap_with_pension: Decimal,
    /// Pillar 3a maximum for taxpayers without a pension fund.
    pub pillar3a_cap_without_pension: Decimal,
    /// Share of earned income that bounds the pillar 3a deduction without a
    /// pension fund.
    pub pillar3a_income_share_without_pension: Decimal,

    pub insurance_cap_single: Decimal,
    pub insurance_cap_married: Decimal,
    pub insurance_cap_per_child: Decimal,

    /// Professional expenses maximum per earning spouse.
    pub professional_expenses_cap: Decimal,
    pub childcare_cap_per_child: Decimal,
    pub training_cap: Decimal,

    /// Added to other income to bound the mortgage interest deduction.
    pub private_interest_allowance: Decimal,
    /// Medical costs are deductible only above this share of net income.
    pub medical_threshold_share: Decimal,
    /// Donations are deductible up to this share of net income.
    pub donations_share: Decimal,

    pub child_deduction: Decimal,

    pub dual_income_share: Decimal,
    pub dual_income_min: Decimal,
    pub dual_income_max: Decimal,
}

impl TaxYearConfig {
    /// Validates that amounts are non-negative, shares lie in `[0, 1]` and
    /// the dual-income bounds are ordered.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidConfig`] for the first offending field.
    pub fn validate(&self) -> Result<(), TaxError> {
        let amounts = [
            ("pillar3a_cap_with_pension", self.pillar3a_cap_with_pension),
            ("pillar3a_cap_without_pension", self.pillar3a_cap_without_pension),
            ("insurance_cap_single", self.insurance_cap_single),
            ("insurance_cap_married", self.insurance_cap_married),
            ("insurance_cap_per_child", self.insurance_cap_per_child),
            ("professional_expenses_cap", self.professional_expenses_cap),
            ("childcare_cap_per_child", self.childcare_cap_per_child),
            ("training_cap", self.training_cap),
            ("private_interest_allowance", self.private_interest_allowance),
            ("child_deduction", self.child_deduction),
            ("dual_income_min", self.dual_income_min),
            ("dual_income_max", self.dual_income_max),
        ];
        for (name, amount) in amounts {
            if amount < Decimal::ZERO {
                return Err(TaxError::InvalidConfig(format!(
                    "{}: {name} {amount} is negative",
                    self.tax_year
                )));
            }
        }

        let shares = [
            (
                "pillar3a_income_share_without_pension",
                self.pillar3a_income_share_without_pension,
            ),
            ("medical_threshold_share", self.medical_threshold_share),
            ("donations_share", self.donations_share),
            ("dual_income_share", self.dual_income_share),
        ];
        for (name, share) in shares {
            if share < Decimal::ZERO || share > Decimal::ONE {
                return Err(TaxError::InvalidConfig(format!(
                    "{}: {name} {share} is outside [0, 1]",
                    self.tax_year
                )));
            }
        }

        if self.dual_income_min > self.dual_income_max {
            return Err(TaxError::InvalidConfig(format!(
                "{}: dual_income_min {} exceeds dual_income_max {}",
                self.tax_year, self.dual_income_min, self.dual_income_max
            )));
        }

        Ok(())
    }
}
