use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Confession, FilingStatus};
use crate::TaxError;

/// Upper bound on declared children; anything above is treated as a typo.
pub const MAX_CHILDREN: u32 = 20;

/// Upper bound on any declared amount, in CHF (10^15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2764472320, 232830, 0, false, 0);

/// Deduction categories, both declared and statutory.
///
/// Serialized names match the field names of [`Deductions`] so warnings can
/// be mapped back to form inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeductionKind {
    Pillar3a,
    InsurancePremiums,
    ProfessionalExpenses,
    ChildcareExpenses,
    TrainingExpenses,
    Donations,
    MortgageInterest,
    Alimony,
    MedicalExpenses,
    /// Statutory deduction for married couples where both spouses earn.
    DualIncome,
    /// Statutory per-child deduction.
    Children,
}

impl DeductionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pillar3a => "pillar3a",
            Self::InsurancePremiums => "insurancePremiums",
            Self::ProfessionalExpenses => "professionalExpenses",
            Self::ChildcareExpenses => "childcareExpenses",
            Self::TrainingExpenses => "trainingExpenses",
            Self::Donations => "donations",
            Self::MortgageInterest => "mortgageInterest",
            Self::Alimony => "alimony",
            Self::MedicalExpenses => "medicalExpenses",
            Self::DualIncome => "dualIncome",
            Self::Children => "children",
        }
    }
}

impl fmt::Display for DeductionKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deductions as declared by the taxpayer, before any cap is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deductions {
    pub pillar3a: Decimal,
    pub insurance_premiums: Decimal,
    pub professional_expenses: Decimal,
    pub childcare_expenses: Decimal,
    pub training_expenses: Decimal,
    pub donations: Decimal,
    pub mortgage_interest: Decimal,
    pub alimony: Decimal,
    pub medical_expenses: Decimal,
}

impl Deductions {
    /// Declared amounts paired with their category.
    pub fn entries(&self) -> [(DeductionKind, Decimal); 9] {
        [
            (DeductionKind::Pillar3a, self.pillar3a),
            (DeductionKind::InsurancePremiums, self.insurance_premiums),
            (DeductionKind::ProfessionalExpenses, self.professional_expenses),
            (DeductionKind::ChildcareExpenses, self.childcare_expenses),
            (DeductionKind::TrainingExpenses, self.training_expenses),
            (DeductionKind::Donations, self.donations),
            (DeductionKind::MortgageInterest, self.mortgage_interest),
            (DeductionKind::Alimony, self.alimony),
            (DeductionKind::MedicalExpenses, self.medical_expenses),
        ]
    }
}

fn default_true() -> bool {
    true
}

/// Financial facts of one household for one tax year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxpayerProfile {
    pub gross_salary: Decimal,
    #[serde(default)]
    pub other_income: Decimal,
    /// Two-letter canton code; resolved by the engine.
    pub canton: String,
    pub filing_status: FilingStatus,
    #[serde(default)]
    pub number_of_children: u32,
    #[serde(default)]
    pub gross_wealth: Decimal,
    #[serde(default)]
    pub debts: Decimal,
    #[serde(default)]
    pub deductions: Deductions,

    /// Earned income of the second spouse or partner.
    #[serde(default)]
    pub spouse_gross_salary: Decimal,
    #[serde(default = "default_true")]
    pub has_employer_pension: bool,
    #[serde(default)]
    pub confession: Confession,
}

impl TaxpayerProfile {
    /// Rejects negative or out-of-range amounts and malformed fields.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::InvalidInput`] naming the first offending field.
    pub fn validate(&self) -> Result<(), TaxError> {
        let amounts = [
            ("grossSalary", self.gross_salary),
            ("otherIncome", self.other_income),
            ("spouseGrossSalary", self.spouse_gross_salary),
            ("grossWealth", self.gross_wealth),
            ("debts", self.debts),
        ];
        for (field, amount) in amounts {
            check_amount(field, amount)?;
        }

        for (kind, amount) in self.deductions.entries() {
            check_amount(format!("deductions.{kind}"), amount)?;
        }

        if self.number_of_children > MAX_CHILDREN {
            return Err(TaxError::invalid_input(
                "numberOfChildren",
                format!(
                    "{} exceeds the maximum of {MAX_CHILDREN}",
                    self.number_of_children
                ),
            ));
        }

        if !self.filing_status.is_joint() && self.spouse_gross_salary > Decimal::ZERO {
            return Err(TaxError::invalid_input(
                "spouseGrossSalary",
                "only married or registered-partnership profiles have a spouse salary",
            ));
        }

        if self.canton.trim().len() != 2 {
            return Err(TaxError::invalid_input(
                "canton",
                format!("'{}' is not a two-letter code", self.canton),
            ));
        }

        Ok(())
    }

    /// Salary of both spouses.
    pub fn earned_income(&self) -> Decimal {
        self.gross_salary + self.spouse_gross_salary
    }

    pub fn gross_income(&self) -> Decimal {
        self.earned_income() + self.other_income
    }

    /// Number of spouses with earned income (0, 1 or 2).
    pub fn earners(&self) -> u32 {
        [self.gross_salary, self.spouse_gross_salary]
            .into_iter()
            .filter(|salary| *salary > Decimal::ZERO)
            .count() as u32
    }
}

fn check_amount(
    field: impl Into<String>,
    amount: Decimal,
) -> Result<(), TaxError> {
    if amount < Decimal::ZERO {
        return Err(TaxError::invalid_input(
            field,
            format!("amount {amount} is negative"),
        ));
    }
    if amount > MAX_AMOUNT {
        return Err(TaxError::invalid_input(
            field,
            format!("amount {amount} exceeds the maximum of {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}
