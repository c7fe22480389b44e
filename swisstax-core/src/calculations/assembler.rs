//! Packs the deduction and composition outputs into the public result.
//!
//! No arithmetic happens here; every figure was rounded where it was
//! computed.

use crate::calculations::composer::Composition;
use crate::calculations::deductions::DeductionResult;
use crate::{ResultDetails, TaxBreakdown, TaxCalculationResult, TaxRates};

pub fn assemble(
    deductions: DeductionResult,
    composition: Composition,
) -> TaxCalculationResult {
    TaxCalculationResult {
        taxable_income: deductions.taxable_income,
        taxable_wealth: deductions.taxable_wealth,
        taxes: TaxBreakdown {
            federal: composition.federal.tax,
            cantonal: composition.cantonal.tax,
            communal: composition.communal,
            confessional: composition.confessional,
            wealth: composition.wealth.total,
            total: composition.total,
        },
        rates: TaxRates {
            effective: composition.effective_rate,
            marginal: composition.marginal_rate,
        },
        details: ResultDetails {
            bracket_reached: composition.cantonal.bracket_index,
            schedule_label: composition.schedule_label,
            communal_coefficient: composition.communal_coefficient,
        },
        warnings: deductions.clamped,
    }
}
