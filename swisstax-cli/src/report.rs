//! Rendering of a calculation result.

use anyhow::Result;
use clap::ValueEnum;
use rust_decimal::{Decimal, RoundingStrategy};
use swisstax_core::TaxCalculationResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON, decimals as strings
    #[default]
    Json,
    /// Aligned plain-text summary
    Text,
}

pub fn render(
    result: &TaxCalculationResult,
    canton: &str,
    year: i32,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(render_text(result, canton, year)),
    }
}

fn percent(rate: Decimal) -> String {
    let percent = (rate * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{percent:.2}%")
}

fn render_text(
    result: &TaxCalculationResult,
    canton: &str,
    year: i32,
) -> String {
    let taxes = &result.taxes;
    let mut lines = vec![
        format!(
            "Tax year {year}, {} ({})",
            canton.to_ascii_uppercase(),
            result.details.schedule_label
        ),
        String::new(),
    ];

    for (label, amount) in [
        ("Taxable income", result.taxable_income),
        ("Taxable wealth", result.taxable_wealth),
        ("Federal tax", taxes.federal),
        ("Cantonal tax", taxes.cantonal),
        ("Communal tax", taxes.communal),
        ("Confessional tax", taxes.confessional),
        ("Wealth tax", taxes.wealth),
        ("Total tax", taxes.total),
    ] {
        lines.push(format!("{label:<18}{:>14.2}", amount));
    }

    lines.push(String::new());
    lines.push(format!("{:<18}{:>14}", "Effective rate", percent(result.rates.effective)));
    lines.push(format!("{:<18}{:>14}", "Marginal rate", percent(result.rates.marginal)));
    lines.push(format!(
        "{:<18}{:>14}",
        "Communal coeff.",
        result.details.communal_coefficient.to_string()
    ));

    if !result.warnings.is_empty() {
        lines.push(String::new());
        lines.push("Deductions reduced to their limit:".to_string());
        for warning in &result.warnings {
            lines.push(format!(
                "  {}: declared {:.2}, allowed {:.2}",
                warning.deduction_name, warning.requested_amount, warning.clamped_amount
            ));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use swisstax_core::{
        DeductionKind, DeductionWarning, ResultDetails, TaxBreakdown, TaxRates,
    };

    use super::*;

    fn result() -> TaxCalculationResult {
        TaxCalculationResult {
            taxable_income: dec!(72944),
            taxable_wealth: dec!(0),
            taxes: TaxBreakdown {
                federal: dec!(1200.50),
                cantonal: dec!(3900.00),
                communal: dec!(4641.00),
                confessional: dec!(0),
                wealth: dec!(0),
                total: dec!(9741.50),
            },
            rates: TaxRates {
                effective: dec!(0.121769),
                marginal: dec!(0.2721),
            },
            details: ResultDetails {
                bracket_reached: 7,
                schedule_label: "Zurich basic tariff".to_string(),
                communal_coefficient: dec!(1.19),
            },
            warnings: vec![DeductionWarning {
                deduction_name: DeductionKind::Pillar3a,
                requested_amount: dec!(8000),
                clamped_amount: dec!(7056),
            }],
        }
    }

    #[test]
    fn json_output_uses_result_field_names() {
        let json = render(&result(), "ZH", 2025, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["taxes"]["total"], "9741.50");
        assert_eq!(value["rates"]["marginal"], "0.2721");
        assert_eq!(value["warnings"][0]["deductionName"], "pillar3a");
    }

    #[test]
    fn text_output_lists_every_figure() {
        let text = render(&result(), "zh", 2025, OutputFormat::Text).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Tax year 2025, ZH (Zurich basic tariff)");
        assert_eq!(lines[2], "Taxable income          72944.00");
        assert_eq!(lines[9], "Total tax                9741.50");
        assert!(text.contains("Effective rate            12.18%"));
        assert!(text.contains("Marginal rate             27.21%"));
        assert!(text.contains("  pillar3a: declared 8000.00, allowed 7056.00"));
    }

    #[test]
    fn text_output_omits_empty_warning_section() {
        let mut quiet = result();
        quiet.warnings.clear();

        let text = render(&quiet, "ZH", 2025, OutputFormat::Text).unwrap();

        assert!(!text.contains("Deductions reduced"));
    }
}
