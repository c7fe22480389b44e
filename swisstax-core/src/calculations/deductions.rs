//! Deduction pipeline: turns a [`TaxpayerProfile`] into taxable bases.
//!
//! # Order of application
//!
//! | Step | Deduction | Limit |
//! |------|-----------|-------|
//! | 1    | Pillar 3a | fixed cap per earner with pension fund, else share of earned income up to a cap |
//! | 2    | Insurance premiums | single/married cap plus per-child addition |
//! | 3    | Professional expenses | cap per earner |
//! | 4    | Childcare | cap per child |
//! | 5    | Training | flat cap |
//! | 6    | Mortgage interest | other income plus private interest allowance |
//! | 7    | Alimony | uncapped |
//! | 8    | Dual-income (statutory) | share of lower income within min/max, at most the lower income |
//! | 9    | Children (statutory) | fixed amount per child |
//! | 10   | Medical expenses | only the part above a share of net income after steps 1–9 |
//! | 11   | Donations | share of net income after steps 1–10 |
//!
//! A declared amount above its limit is clamped, never rejected, and the
//! clamp is reported as a [`DeductionWarning`]. Statutory deductions are
//! computed, not declared, and never produce warnings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{clamp_to_cap, floor_at_zero, round_half_up};
use crate::{
    DeductionKind, DeductionWarning, FilingMode, JurisdictionConfig, TaxError, TaxYearConfig,
    TaxpayerProfile,
};

/// One deduction as it entered the taxable base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDeduction {
    pub kind: DeductionKind,
    pub amount: Decimal,
}

/// Taxable bases derived from a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionResult {
    /// Salary of both spouses plus other income.
    pub gross_income: Decimal,
    pub taxable_income: Decimal,
    /// Gross wealth minus debts; may be negative.
    pub net_wealth: Decimal,
    pub taxable_wealth: Decimal,
    pub total_deductions: Decimal,
    pub applied: Vec<AppliedDeduction>,
    pub clamped: Vec<DeductionWarning>,
}

#[derive(Debug, Default)]
struct Ledger {
    applied: Vec<AppliedDeduction>,
    clamped: Vec<DeductionWarning>,
}

impl Ledger {
    /// Records a declared deduction, clamped to `cap`.
    fn declared(
        &mut self,
        kind: DeductionKind,
        requested: Decimal,
        cap: Decimal,
    ) -> Decimal {
        let cap = round_half_up(floor_at_zero(cap));
        let (allowed, was_clamped) = clamp_to_cap(requested, cap);

        if was_clamped {
            warn!(
                deduction = %kind,
                requested = %requested,
                allowed = %allowed,
                "deduction clamped to statutory cap"
            );
            self.clamped.push(DeductionWarning {
                deduction_name: kind,
                requested_amount: requested,
                clamped_amount: allowed,
            });
        }

        self.record(kind, allowed)
    }

    /// Records a statutory deduction.
    fn statutory(
        &mut self,
        kind: DeductionKind,
        amount: Decimal,
    ) -> Decimal {
        self.record(kind, round_half_up(floor_at_zero(amount)))
    }

    fn record(
        &mut self,
        kind: DeductionKind,
        amount: Decimal,
    ) -> Decimal {
        if amount > Decimal::ZERO {
            self.applied.push(AppliedDeduction { kind, amount });
        }
        amount
    }

    fn total(&self) -> Decimal {
        self.applied.iter().map(|d| d.amount).sum()
    }
}

/// Applies one tax year's statutory limits and one canton's wealth
/// exemption to taxpayer profiles.
#[derive(Debug, Clone)]
pub struct DeductionPipeline<'a> {
    limits: &'a TaxYearConfig,
    jurisdiction: &'a JurisdictionConfig,
}

impl<'a> DeductionPipeline<'a> {
    pub fn new(
        limits: &'a TaxYearConfig,
        jurisdiction: &'a JurisdictionConfig,
    ) -> Self {
        Self {
            limits,
            jurisdiction,
        }
    }

    /// Computes taxable income and taxable wealth.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] if the profile carries a negative
    /// or malformed field. Validation runs before any deduction is applied.
    pub fn run(
        &self,
        profile: &TaxpayerProfile,
    ) -> Result<DeductionResult, TaxError> {
        profile.validate()?;

        let declared = &profile.deductions;
        let children = profile.number_of_children;
        let filing_mode = profile.filing_status.filing_mode();
        let gross_income = profile.gross_income();

        let mut ledger = Ledger::default();

        ledger.declared(
            DeductionKind::Pillar3a,
            declared.pillar3a,
            self.pillar3a_cap(profile),
        );
        ledger.declared(
            DeductionKind::InsurancePremiums,
            declared.insurance_premiums,
            self.insurance_cap(filing_mode, children),
        );
        ledger.declared(
            DeductionKind::ProfessionalExpenses,
            declared.professional_expenses,
            self.professional_expenses_cap(profile),
        );
        ledger.declared(
            DeductionKind::ChildcareExpenses,
            declared.childcare_expenses,
            self.childcare_cap(children),
        );
        ledger.declared(
            DeductionKind::TrainingExpenses,
            declared.training_expenses,
            self.limits.training_cap,
        );
        ledger.declared(
            DeductionKind::MortgageInterest,
            declared.mortgage_interest,
            self.mortgage_interest_cap(profile),
        );
        ledger.record(DeductionKind::Alimony, declared.alimony);
        ledger.statutory(DeductionKind::DualIncome, self.dual_income_deduction(profile));
        ledger.statutory(DeductionKind::Children, self.child_deduction(children));

        let net_income = floor_at_zero(gross_income - ledger.total());
        ledger.declared(
            DeductionKind::MedicalExpenses,
            declared.medical_expenses,
            self.medical_expenses_allowance(declared.medical_expenses, net_income),
        );

        let net_income = floor_at_zero(gross_income - ledger.total());
        ledger.declared(
            DeductionKind::Donations,
            declared.donations,
            self.donations_cap(net_income),
        );

        let total_deductions = ledger.total();
        let taxable_income = self.taxable_income(gross_income, total_deductions);

        let net_wealth = profile.gross_wealth - profile.debts;
        let taxable_wealth = self.taxable_wealth(net_wealth, filing_mode, children);

        debug!(
            gross_income = %gross_income,
            total_deductions = %total_deductions,
            taxable_income = %taxable_income,
            taxable_wealth = %taxable_wealth,
            clamped = ledger.clamped.len(),
            "deductions applied"
        );

        Ok(DeductionResult {
            gross_income,
            taxable_income,
            net_wealth,
            taxable_wealth,
            total_deductions,
            applied: ledger.applied,
            clamped: ledger.clamped,
        })
    }

    /// Pillar 3a maximum. Each earning spouse has their own account; without
    /// earned income nothing can be contributed.
    fn pillar3a_cap(
        &self,
        profile: &TaxpayerProfile,
    ) -> Decimal {
        let earners = Decimal::from(profile.earners());

        if profile.has_employer_pension {
            self.limits.pillar3a_cap_with_pension * earners
        } else {
            let income_bound =
                profile.earned_income() * self.limits.pillar3a_income_share_without_pension;
            income_bound.min(self.limits.pillar3a_cap_without_pension * earners)
        }
    }

    fn insurance_cap(
        &self,
        filing_mode: FilingMode,
        children: u32,
    ) -> Decimal {
        let base = match filing_mode {
            FilingMode::Single => self.limits.insurance_cap_single,
            FilingMode::Married => self.limits.insurance_cap_married,
        };
        base + self.limits.insurance_cap_per_child * Decimal::from(children)
    }

    fn professional_expenses_cap(
        &self,
        profile: &TaxpayerProfile,
    ) -> Decimal {
        self.limits.professional_expenses_cap * Decimal::from(profile.earners())
    }

    fn childcare_cap(
        &self,
        children: u32,
    ) -> Decimal {
        self.limits.childcare_cap_per_child * Decimal::from(children)
    }

    fn mortgage_interest_cap(
        &self,
        profile: &TaxpayerProfile,
    ) -> Decimal {
        profile.other_income + self.limits.private_interest_allowance
    }

    /// Half of the lower spouse income, kept within the statutory bounds and
    /// never above the lower income itself.
    fn dual_income_deduction(
        &self,
        profile: &TaxpayerProfile,
    ) -> Decimal {
        if !profile.filing_status.is_joint() || profile.earners() < 2 {
            return Decimal::ZERO;
        }

        let lower = profile.gross_salary.min(profile.spouse_gross_salary);
        let share = lower * self.limits.dual_income_share;
        share
            .clamp(self.limits.dual_income_min, self.limits.dual_income_max)
            .min(lower)
    }

    fn child_deduction(
        &self,
        children: u32,
    ) -> Decimal {
        self.limits.child_deduction * Decimal::from(children)
    }

    /// Deductible part of medical costs: whatever exceeds the threshold share
    /// of net income.
    fn medical_expenses_allowance(
        &self,
        medical_expenses: Decimal,
        net_income: Decimal,
    ) -> Decimal {
        floor_at_zero(medical_expenses - net_income * self.limits.medical_threshold_share)
    }

    fn donations_cap(
        &self,
        net_income: Decimal,
    ) -> Decimal {
        net_income * self.limits.donations_share
    }

    fn taxable_income(
        &self,
        gross_income: Decimal,
        total_deductions: Decimal,
    ) -> Decimal {
        round_half_up(floor_at_zero(gross_income - total_deductions))
    }

    fn taxable_wealth(
        &self,
        net_wealth: Decimal,
        filing_mode: FilingMode,
        children: u32,
    ) -> Decimal {
        let exemption = self.jurisdiction.wealth_exemption(filing_mode, children);
        round_half_up(floor_at_zero(net_wealth - exemption))
    }
}
