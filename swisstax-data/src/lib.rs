//! CSV tables for the tax engine: bracket schedules, canton configs and
//! yearly deduction limits.

mod builtin;
mod loader;

pub use builtin::{BUILTIN_BRACKETS, BUILTIN_JURISDICTIONS, BUILTIN_LIMITS, builtin_registry};
pub use loader::{
    BracketRecord, JurisdictionRecord, LoadSummary, ScheduleLoader, ScheduleLoaderError,
};
