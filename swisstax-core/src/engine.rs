//! Entry point: one profile, one tax year, one result.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use swisstax_core::{
//!     Bracket, Canton, ConfessionalRates, FilingMode, Jurisdiction,
//!     JurisdictionConfig, RegistryBuilder, ScheduleKey, TaxEngine, TaxYearConfig,
//!     TaxpayerProfile,
//! };
//!
//! let mut builder = RegistryBuilder::new();
//! for (jurisdiction, rate) in [
//!     (Jurisdiction::Federal, dec!(0.02)),
//!     (Jurisdiction::Canton(Canton::Zg), dec!(0.05)),
//! ] {
//!     builder
//!         .register_brackets(
//!             ScheduleKey::income(jurisdiction, 2025, FilingMode::Single),
//!             "",
//!             vec![Bracket::new(dec!(0), dec!(0)), Bracket::new(dec!(20000), rate)],
//!         )
//!         .unwrap();
//! }
//! builder
//!     .register_jurisdiction(JurisdictionConfig {
//!         canton: Canton::Zg,
//!         tax_year: 2025,
//!         label: "Zug".to_string(),
//!         communal_coefficient: dec!(0.5),
//!         confessional_rates: ConfessionalRates::default(),
//!         levies_wealth_tax: false,
//!         wealth_exemption_single: dec!(0),
//!         wealth_exemption_married: dec!(0),
//!         wealth_exemption_per_child: dec!(0),
//!         splitting_divisor: None,
//!     })
//!     .unwrap();
//! builder
//!     .register_tax_year(TaxYearConfig {
//!         tax_year: 2025,
//!         pillar3a_cap_with_pension: dec!(7258),
//!         pillar3a_cap_without_pension: dec!(36288),
//!         pillar3a_income_share_without_pension: dec!(0.20),
//!         insurance_cap_single: dec!(1800),
//!         insurance_cap_married: dec!(3600),
//!         insurance_cap_per_child: dec!(700),
//!         professional_expenses_cap: dec!(4000),
//!         childcare_cap_per_child: dec!(25800),
//!         training_cap: dec!(13000),
//!         private_interest_allowance: dec!(50000),
//!         medical_threshold_share: dec!(0.05),
//!         donations_share: dec!(0.20),
//!         child_deduction: dec!(6800),
//!         dual_income_share: dec!(0.50),
//!         dual_income_min: dec!(8600),
//!         dual_income_max: dec!(14100),
//!     })
//!     .unwrap();
//! let registry = builder.build();
//!
//! let profile: TaxpayerProfile = serde_json::from_str(
//!     r#"{ "grossSalary": "60000", "canton": "ZG", "filingStatus": "single",
//!          "grossWealth": "0", "debts": "0" }"#,
//! )
//! .unwrap();
//!
//! let result = TaxEngine::new(&registry).calculate(&profile, 2025).unwrap();
//!
//! // 40'000 above the zero bracket: 800 federal, 2'000 cantonal, 1'000 communal
//! assert_eq!(result.taxes.total, dec!(3800.00));
//! assert_eq!(result.taxes.wealth, dec!(0));
//! ```

use tracing::debug;

use crate::calculations::{
    CompositionInput, DeductionPipeline, JurisdictionComposer, WealthTaxEvaluator, assemble,
};
use crate::{
    Canton, Jurisdiction, ScheduleKey, ScheduleRegistry, TaxCalculationResult, TaxError,
    TaxpayerProfile,
};

/// Runs calculations against one registry snapshot.
///
/// The engine holds no state of its own; any number of calculations may
/// run on the same registry in parallel.
#[derive(Debug, Clone, Copy)]
pub struct TaxEngine<'a> {
    registry: &'a ScheduleRegistry,
}

impl<'a> TaxEngine<'a> {
    pub fn new(registry: &'a ScheduleRegistry) -> Self {
        Self { registry }
    }

    /// Computes federal, cantonal, communal, confessional and wealth tax for
    /// `profile` in `year`.
    ///
    /// Nothing is defaulted: every schedule, config and limit the
    /// calculation needs must be registered for `year`.
    ///
    /// # Errors
    ///
    /// * [`TaxError::InvalidInput`]: the profile fails validation.
    /// * [`TaxError::UnknownJurisdiction`]: the canton code is not a canton
    ///   or has no schedules.
    /// * [`TaxError::MissingTaxYearConfig`],
    ///   [`TaxError::MissingJurisdictionConfig`],
    ///   [`TaxError::MissingScheduleForYear`]: registry gaps for `year`.
    /// * [`TaxError::InvalidConfig`],
    ///   [`TaxError::IncompatibleJurisdictionConfig`]: registered data that
    ///   cannot be combined.
    pub fn calculate(
        &self,
        profile: &TaxpayerProfile,
        year: i32,
    ) -> Result<TaxCalculationResult, TaxError> {
        profile.validate()?;

        let canton = self.resolve_canton(&profile.canton)?;
        let filing_mode = profile.filing_status.filing_mode();
        debug!(%canton, year, %filing_mode, "calculating");

        let limits = self.registry.tax_year_config(year)?;
        let config = self.registry.jurisdiction_config(canton, year)?;

        let federal = self
            .registry
            .schedule(&ScheduleKey::income(Jurisdiction::Federal, year, filing_mode))?;
        let cantonal = self.registry.schedule(&ScheduleKey::income(
            Jurisdiction::Canton(canton),
            year,
            config.cantonal_income_mode(filing_mode),
        ))?;
        let wealth_schedule = self.registry.find_schedule(&ScheduleKey::wealth(
            Jurisdiction::Canton(canton),
            year,
            filing_mode,
        ));

        let composer = JurisdictionComposer::new(federal, cantonal, config)?;
        let wealth = WealthTaxEvaluator::new(config, wealth_schedule, filing_mode)?;

        let deductions = DeductionPipeline::new(limits, config).run(profile)?;
        let wealth_tax = wealth.evaluate(deductions.taxable_wealth);

        let composition = composer.compose(&CompositionInput {
            taxable_income: deductions.taxable_income,
            gross_income: deductions.gross_income,
            filing_mode,
            confession: profile.confession,
            wealth: wealth_tax,
        })?;

        Ok(assemble(deductions, composition))
    }

    fn resolve_canton(
        &self,
        code: &str,
    ) -> Result<Canton, TaxError> {
        match Jurisdiction::parse(code) {
            Some(jurisdiction @ Jurisdiction::Canton(canton))
                if self.registry.knows(jurisdiction) =>
            {
                Ok(canton)
            }
            _ => Err(TaxError::UnknownJurisdiction(code.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::test_support::{
        federal_married, federal_single, limits, profile, registry, registry_builder, schedule,
        zurich_config, zurich_married, zurich_single, zurich_wealth,
    };
    use crate::{
        Confession, DeductionKind, DeductionWarning, FilingMode, FilingStatus, MAX_AMOUNT,
        ScheduleRegistry, TaxBase,
    };

    fn calculate(
        registry: &ScheduleRegistry,
        profile: &TaxpayerProfile,
    ) -> Result<TaxCalculationResult, TaxError> {
        TaxEngine::new(registry).calculate(profile, 2024)
    }

    fn married(
        salary: Decimal,
        spouse: Decimal,
    ) -> TaxpayerProfile {
        let mut p = profile(salary);
        p.filing_status = FilingStatus::Married;
        p.spouse_gross_salary = spouse;
        p
    }

    /// Federal fixtures plus a flat 12% Bern schedule at communal
    /// coefficient 1.0 without wealth tax.
    fn flat_bern_registry() -> ScheduleRegistry {
        let mut builder = registry_builder();
        builder
            .register_schedule(schedule(
                ScheduleKey::income(Jurisdiction::Canton(Canton::Be), 2024, FilingMode::Single),
                &[(dec!(0), dec!(0.12))],
            ))
            .unwrap();
        let mut bern = zurich_config();
        bern.canton = Canton::Be;
        bern.label = "Bern".to_string();
        bern.communal_coefficient = dec!(1.0);
        bern.levies_wealth_tax = false;
        builder.register_jurisdiction(bern).unwrap();
        builder.build()
    }

    // =========================================================================
    // scenarios
    // =========================================================================

    #[test]
    fn single_flat_canton_communal_equals_cantonal() {
        let registry = flat_bern_registry();
        let mut p = profile(dec!(80000));
        p.canton = "BE".to_string();

        let result = calculate(&registry, &p).unwrap();

        assert_eq!(result.taxable_income, dec!(80000));
        assert_eq!(result.taxes.cantonal, dec!(9600.00));
        assert_eq!(result.taxes.communal, result.taxes.cantonal);
        assert_eq!(result.taxes.federal, dec!(1554.08));
        assert_eq!(result.taxes.total, dec!(20754.08));
        assert!(result.taxes.total < dec!(80000) * result.rates.marginal);
        assert!(result.rates.effective <= result.rates.marginal);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn married_couple_gets_dual_income_deduction() {
        let result = calculate(&registry(), &married(dec!(100000), dec!(50000))).unwrap();

        // 150'000 - min(25'000, ceiling 13'600)
        assert_eq!(result.taxable_income, dec!(136400));
        assert_eq!(result.details.schedule_label, "ZH income 2024 married");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn married_couple_with_wide_ceiling_deducts_half_lower_income() {
        let mut builder = ScheduleRegistry::builder();
        for schedule in [
            federal_married(),
            zurich_married(),
            zurich_wealth(FilingMode::Married),
        ] {
            builder.register_schedule(schedule).unwrap();
        }
        builder.register_jurisdiction(zurich_config()).unwrap();
        let mut wide = limits();
        wide.dual_income_max = dec!(30000);
        builder.register_tax_year(wide).unwrap();
        let registry = builder.build();

        let result = calculate(&registry, &married(dec!(100000), dec!(50000))).unwrap();

        assert_eq!(result.taxable_income, dec!(125000));
    }

    #[test]
    fn pillar3a_over_cap_is_clamped_with_warning() {
        let mut p = profile(dec!(80000));
        p.deductions.pillar3a = dec!(8000);

        let result = calculate(&registry(), &p).unwrap();

        assert_eq!(result.taxable_income, dec!(72944));
        assert_eq!(
            result.warnings,
            vec![DeductionWarning {
                deduction_name: DeductionKind::Pillar3a,
                requested_amount: dec!(8000),
                clamped_amount: dec!(7056),
            }]
        );
    }

    #[test]
    fn full_zurich_calculation() {
        let mut p = profile(dec!(80000));
        p.confession = Confession::Reformed;
        p.gross_wealth = dec!(500000);
        p.debts = dec!(100000);

        let result = calculate(&registry(), &p).unwrap();

        assert_eq!(result.taxable_wealth, dec!(320000));
        assert_eq!(result.taxes.federal, dec!(1554.08));
        assert_eq!(result.taxes.cantonal, dec!(4470.00));
        assert_eq!(result.taxes.communal, dec!(5319.30));
        assert_eq!(result.taxes.confessional, dec!(447.00));
        assert_eq!(result.taxes.wealth, dec!(615.39));
        assert_eq!(result.taxes.total, dec!(12405.77));
        // 12'405.77 / 80'000
        assert_eq!(result.rates.effective, dec!(0.155072));
        assert_eq!(result.rates.marginal, dec!(0.2721));
        assert_eq!(result.details.bracket_reached, 8);
        assert_eq!(result.details.communal_coefficient, dec!(1.19));
    }

    #[test]
    fn registered_partnership_is_taxed_as_married() {
        let mut partners = married(dec!(100000), dec!(50000));
        partners.filing_status = FilingStatus::RegisteredPartnership;

        let partnership = calculate(&registry(), &partners).unwrap();
        let marriage = calculate(&registry(), &married(dec!(100000), dec!(50000))).unwrap();

        assert_eq!(partnership, marriage);
    }

    #[test]
    fn canton_code_is_case_insensitive() {
        let mut p = profile(dec!(80000));
        p.canton = "zh".to_string();

        let result = calculate(&registry(), &p);

        assert!(result.is_ok());
    }

    // =========================================================================
    // failures
    // =========================================================================

    #[test]
    fn invalid_profile_is_rejected() {
        let mut p = profile(dec!(80000));
        p.gross_wealth = dec!(-1);

        assert!(matches!(
            calculate(&registry(), &p),
            Err(TaxError::InvalidInput { .. })
        ));
    }

    #[test]
    fn overflowing_amounts_are_rejected_not_computed() {
        let mut rich = profile(Decimal::MAX);
        rich.other_income = dec!(1);

        let mut indebted = profile(dec!(0));
        indebted.debts = Decimal::MAX;

        for p in [rich, indebted] {
            assert!(matches!(
                calculate(&registry(), &p),
                Err(TaxError::InvalidInput { .. })
            ));
        }
    }

    #[test]
    fn largest_valid_amounts_do_not_overflow() {
        let mut p = married(MAX_AMOUNT, MAX_AMOUNT);
        p.other_income = MAX_AMOUNT;
        p.gross_wealth = MAX_AMOUNT;
        p.deductions.alimony = MAX_AMOUNT;

        assert!(calculate(&registry(), &p).is_ok());

        let mut p = profile(dec!(0));
        p.debts = MAX_AMOUNT;

        let result = calculate(&registry(), &p).unwrap();

        assert_eq!(result.taxable_wealth, dec!(0));
        assert_eq!(result.taxes.total, dec!(0));
    }

    #[test]
    fn unknown_canton_code() {
        let mut p = profile(dec!(80000));
        p.canton = "XX".to_string();

        assert_eq!(
            calculate(&registry(), &p),
            Err(TaxError::UnknownJurisdiction("XX".to_string()))
        );
    }

    #[test]
    fn federal_code_is_not_a_canton() {
        let mut p = profile(dec!(80000));
        p.canton = "CH".to_string();

        assert_eq!(
            calculate(&registry(), &p),
            Err(TaxError::UnknownJurisdiction("CH".to_string()))
        );
    }

    #[test]
    fn canton_without_schedules_is_unknown() {
        let mut p = profile(dec!(80000));
        p.canton = "GE".to_string();

        assert_eq!(
            calculate(&registry(), &p),
            Err(TaxError::UnknownJurisdiction("GE".to_string()))
        );
    }

    #[test]
    fn year_without_limits_is_rejected() {
        let result = TaxEngine::new(&registry()).calculate(&profile(dec!(80000)), 2023);

        assert_eq!(result, Err(TaxError::MissingTaxYearConfig(2023)));
    }

    #[test]
    fn year_without_jurisdiction_config_is_rejected() {
        let mut builder = registry().to_builder();
        let mut next = limits();
        next.tax_year = 2025;
        builder.register_tax_year(next).unwrap();
        let registry = builder.build();

        let result = TaxEngine::new(&registry).calculate(&profile(dec!(80000)), 2025);

        assert_eq!(
            result,
            Err(TaxError::MissingJurisdictionConfig {
                canton: Canton::Zh,
                year: 2025,
            })
        );
    }

    #[test]
    fn missing_wealth_schedule_is_not_zero_tax() {
        let mut builder = ScheduleRegistry::builder();
        builder.register_schedule(federal_single()).unwrap();
        builder.register_schedule(zurich_single()).unwrap();
        builder.register_jurisdiction(zurich_config()).unwrap();
        builder.register_tax_year(limits()).unwrap();
        let registry = builder.build();

        let result = calculate(&registry, &profile(dec!(80000)));

        assert_eq!(
            result,
            Err(TaxError::MissingScheduleForYear {
                jurisdiction: Jurisdiction::Canton(Canton::Zh),
                base: TaxBase::Wealth,
                year: 2024,
                filing_mode: FilingMode::Single,
            })
        );
    }

    #[test]
    fn splitting_canton_uses_single_schedule_for_married() {
        let mut builder = ScheduleRegistry::builder();
        builder.register_schedule(federal_married()).unwrap();
        builder.register_schedule(zurich_single()).unwrap();
        let mut config = zurich_config();
        config.splitting_divisor = Some(dec!(2));
        config.levies_wealth_tax = false;
        builder.register_jurisdiction(config).unwrap();
        builder.register_tax_year(limits()).unwrap();
        let registry = builder.build();

        let result = calculate(&registry, &married(dec!(160000), dec!(0))).unwrap();

        // 2 * T(80'000)
        assert_eq!(result.taxes.cantonal, dec!(8940.00));
        assert_eq!(result.details.schedule_label, "ZH income 2024 single");
    }

    #[test]
    fn married_without_married_schedule_is_missing() {
        let mut builder = ScheduleRegistry::builder();
        builder.register_schedule(federal_married()).unwrap();
        builder.register_schedule(zurich_single()).unwrap();
        builder.register_jurisdiction(zurich_config()).unwrap();
        builder.register_tax_year(limits()).unwrap();
        let registry = builder.build();

        let result = calculate(&registry, &married(dec!(100000), dec!(0)));

        assert_eq!(
            result,
            Err(TaxError::MissingScheduleForYear {
                jurisdiction: Jurisdiction::Canton(Canton::Zh),
                base: TaxBase::Income,
                year: 2024,
                filing_mode: FilingMode::Married,
            })
        );
    }
}
