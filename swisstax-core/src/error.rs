use thiserror::Error;

use crate::models::{Canton, FilingMode, Jurisdiction, TaxBase};

/// Every way a calculation or a registration can fail.
///
/// None of these are recoverable for the calculation in progress. Deductions
/// above a statutory cap are not errors; they are clamped and reported as
/// warnings on the result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    /// A profile field is negative or malformed.
    #[error("invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    /// The jurisdiction code is not a Swiss canton (or `CH`), or nothing is
    /// registered for it.
    #[error("jurisdiction code '{0}' not recognized")]
    UnknownJurisdiction(String),

    /// The jurisdiction is known but has no table for the requested year.
    #[error("no {base} schedule registered for {jurisdiction} in {year} ({filing_mode})")]
    MissingScheduleForYear {
        jurisdiction: Jurisdiction,
        base: TaxBase,
        year: i32,
        filing_mode: FilingMode,
    },

    /// No communal/confessional configuration for the canton and year.
    #[error("no jurisdiction config registered for {canton} in {year}")]
    MissingJurisdictionConfig { canton: Canton, year: i32 },

    /// No statutory deduction limits for the year.
    #[error("no deduction limits registered for tax year {0}")]
    MissingTaxYearConfig(i32),

    /// A schedule failed validation and was not registered.
    #[error("invalid bracket schedule '{label}': {reason}")]
    InvalidBracketSchedule { label: String, reason: String },

    /// A schedule, config or limit set for the same key already exists.
    #[error("'{0}' is already registered")]
    AlreadyRegistered(String),

    /// Configuration data outside its valid range, or wired to the wrong
    /// jurisdiction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The canton's config and the schedule it is combined with belong to
    /// different tax years.
    #[error(
        "jurisdiction config for {canton} is for {config_year} but schedule '{schedule_label}' is for {schedule_year}"
    )]
    IncompatibleJurisdictionConfig {
        canton: Canton,
        config_year: i32,
        schedule_label: String,
        schedule_year: i32,
    },
}

impl TaxError {
    pub(crate) fn invalid_input(
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
