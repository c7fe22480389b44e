//! Fixtures shared by unit tests: 2024 limits, Zurich city and a registry
//! holding the federal and Zurich schedules.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    Bracket, BracketSchedule, Canton, ConfessionalRates, Confession, Deductions, FilingMode,
    FilingStatus, Jurisdiction, JurisdictionConfig, RegistryBuilder, ScheduleKey,
    ScheduleRegistry, TaxYearConfig, TaxpayerProfile,
};

pub const YEAR: i32 = 2024;

pub fn limits() -> TaxYearConfig {
    TaxYearConfig {
        tax_year: YEAR,
        pillar3a_cap_with_pension: dec!(7056),
        pillar3a_cap_without_pension: dec!(35280),
        pillar3a_income_share_without_pension: dec!(0.20),
        insurance_cap_single: dec!(1700),
        insurance_cap_married: dec!(3500),
        insurance_cap_per_child: dec!(700),
        professional_expenses_cap: dec!(4000),
        childcare_cap_per_child: dec!(25500),
        training_cap: dec!(12900),
        private_interest_allowance: dec!(50000),
        medical_threshold_share: dec!(0.05),
        donations_share: dec!(0.20),
        child_deduction: dec!(6700),
        dual_income_share: dec!(0.50),
        dual_income_min: dec!(8300),
        dual_income_max: dec!(13600),
    }
}

/// Single Zurich resident with a pension fund, no wealth and no deductions.
pub fn profile(salary: Decimal) -> TaxpayerProfile {
    TaxpayerProfile {
        gross_salary: salary,
        other_income: Decimal::ZERO,
        canton: "ZH".to_string(),
        filing_status: FilingStatus::Single,
        number_of_children: 0,
        gross_wealth: Decimal::ZERO,
        debts: Decimal::ZERO,
        deductions: Deductions::default(),
        spouse_gross_salary: Decimal::ZERO,
        has_employer_pension: true,
        confession: Confession::None,
    }
}

pub fn zurich_config() -> JurisdictionConfig {
    JurisdictionConfig {
        canton: Canton::Zh,
        tax_year: YEAR,
        label: "Zürich (city)".to_string(),
        communal_coefficient: dec!(1.19),
        confessional_rates: ConfessionalRates {
            reformed: dec!(0.10),
            roman_catholic: dec!(0.10),
            christ_catholic: dec!(0.14),
        },
        levies_wealth_tax: true,
        wealth_exemption_single: dec!(80000),
        wealth_exemption_married: dec!(159000),
        wealth_exemption_per_child: dec!(31000),
        splitting_divisor: None,
    }
}

pub fn schedule(
    key: ScheduleKey,
    brackets: &[(Decimal, Decimal)],
) -> BracketSchedule {
    BracketSchedule::new(
        key,
        "",
        brackets
            .iter()
            .map(|(threshold, rate)| Bracket::new(*threshold, *rate))
            .collect(),
    )
    .expect("fixture schedule is valid")
}

pub fn federal_single() -> BracketSchedule {
    schedule(
        ScheduleKey::income(Jurisdiction::Federal, YEAR, FilingMode::Single),
        &[
            (dec!(0), dec!(0)),
            (dec!(14500), dec!(0.0077)),
            (dec!(31600), dec!(0.0088)),
            (dec!(41400), dec!(0.0264)),
            (dec!(55200), dec!(0.0297)),
            (dec!(72500), dec!(0.0594)),
            (dec!(78100), dec!(0.066)),
            (dec!(103600), dec!(0.088)),
            (dec!(134600), dec!(0.11)),
            (dec!(176000), dec!(0.132)),
        ],
    )
}

pub fn federal_married() -> BracketSchedule {
    schedule(
        ScheduleKey::income(Jurisdiction::Federal, YEAR, FilingMode::Married),
        &[
            (dec!(0), dec!(0)),
            (dec!(28300), dec!(0.01)),
            (dec!(50900), dec!(0.02)),
            (dec!(58400), dec!(0.03)),
            (dec!(75300), dec!(0.04)),
            (dec!(90300), dec!(0.05)),
            (dec!(103400), dec!(0.06)),
            (dec!(114700), dec!(0.07)),
            (dec!(124200), dec!(0.08)),
            (dec!(131700), dec!(0.09)),
            (dec!(137300), dec!(0.10)),
            (dec!(141200), dec!(0.11)),
            (dec!(143100), dec!(0.12)),
            (dec!(145000), dec!(0.13)),
        ],
    )
}

pub fn zurich_single() -> BracketSchedule {
    schedule(
        ScheduleKey::income(Jurisdiction::Canton(Canton::Zh), YEAR, FilingMode::Single),
        &[
            (dec!(0), dec!(0)),
            (dec!(7000), dec!(0.02)),
            (dec!(11000), dec!(0.03)),
            (dec!(16000), dec!(0.04)),
            (dec!(23000), dec!(0.05)),
            (dec!(33000), dec!(0.06)),
            (dec!(43000), dec!(0.07)),
            (dec!(58000), dec!(0.08)),
            (dec!(75000), dec!(0.09)),
            (dec!(109000), dec!(0.10)),
            (dec!(142000), dec!(0.11)),
            (dec!(194000), dec!(0.12)),
            (dec!(263000), dec!(0.13)),
        ],
    )
}

pub fn zurich_married() -> BracketSchedule {
    schedule(
        ScheduleKey::income(Jurisdiction::Canton(Canton::Zh), YEAR, FilingMode::Married),
        &[
            (dec!(0), dec!(0)),
            (dec!(13900), dec!(0.02)),
            (dec!(20200), dec!(0.03)),
            (dec!(28200), dec!(0.04)),
            (dec!(37500), dec!(0.05)),
            (dec!(48000), dec!(0.06)),
            (dec!(61100), dec!(0.07)),
            (dec!(77100), dec!(0.08)),
            (dec!(96600), dec!(0.09)),
            (dec!(142000), dec!(0.10)),
            (dec!(198000), dec!(0.11)),
            (dec!(262000), dec!(0.12)),
            (dec!(364000), dec!(0.13)),
        ],
    )
}

/// Applies to wealth above the personal exemption.
pub fn zurich_wealth(filing_mode: FilingMode) -> BracketSchedule {
    schedule(
        ScheduleKey::wealth(Jurisdiction::Canton(Canton::Zh), YEAR, filing_mode),
        &[
            (dec!(0), dec!(0.0005)),
            (dec!(80000), dec!(0.001)),
            (dec!(318000), dec!(0.0015)),
            (dec!(717000), dec!(0.002)),
            (dec!(1353000), dec!(0.0025)),
            (dec!(2309000), dec!(0.003)),
        ],
    )
}

pub fn registry_builder() -> RegistryBuilder {
    let mut builder = RegistryBuilder::new();
    for schedule in [
        federal_single(),
        federal_married(),
        zurich_single(),
        zurich_married(),
        zurich_wealth(FilingMode::Single),
        zurich_wealth(FilingMode::Married),
    ] {
        builder.register_schedule(schedule).expect("fixture key is unique");
    }
    builder
        .register_jurisdiction(zurich_config())
        .expect("fixture config is valid");
    builder
        .register_tax_year(limits())
        .expect("fixture limits are valid");
    builder
}

pub fn registry() -> ScheduleRegistry {
    registry_builder().build()
}
