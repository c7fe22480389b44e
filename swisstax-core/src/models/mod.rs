mod bracket_schedule;
mod canton;
mod filing_status;
mod jurisdiction;
mod jurisdiction_config;
mod tax_result;
mod tax_year_config;
mod taxpayer_profile;

pub use bracket_schedule::{Bracket, BracketSchedule, ScheduleKey};
pub use canton::Canton;
pub use filing_status::{FilingMode, FilingStatus};
pub use jurisdiction::{Jurisdiction, TaxBase};
pub use jurisdiction_config::{Confession, ConfessionalRates, JurisdictionConfig};
pub use tax_result::{
    DeductionWarning, ResultDetails, TaxBreakdown, TaxCalculationResult, TaxRates,
};
pub use tax_year_config::TaxYearConfig;
pub use taxpayer_profile::{DeductionKind, Deductions, MAX_AMOUNT, MAX_CHILDREN, TaxpayerProfile};
