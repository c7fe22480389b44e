use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DeductionKind;

/// A declared deduction that was reduced to its statutory maximum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionWarning {
    pub deduction_name: DeductionKind,
    pub requested_amount: Decimal,
    pub clamped_amount: Decimal,
}

/// Tax owed per jurisdiction, in CHF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub federal: Decimal,
    /// Cantonal simple tax.
    pub cantonal: Decimal,
    pub communal: Decimal,
    pub confessional: Decimal,
    /// Cantonal plus communal wealth tax.
    pub wealth: Decimal,
    pub total: Decimal,
}

/// `effective` is total tax divided by gross income, not by taxable income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRates {
    pub effective: Decimal,
    pub marginal: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDetails {
    /// Zero-based index of the cantonal income bracket reached.
    pub bracket_reached: usize,
    /// Label of the cantonal income schedule applied.
    pub schedule_label: String,
    pub communal_coefficient: Decimal,
}

/// Outcome of one calculation; field names are a compatibility surface for
/// dashboards and form filling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationResult {
    pub taxable_income: Decimal,
    pub taxable_wealth: Decimal,
    pub taxes: TaxBreakdown,
    pub rates: TaxRates,
    pub details: ResultDetails,
    pub warnings: Vec<DeductionWarning>,
}
