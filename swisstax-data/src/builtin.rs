use swisstax_core::ScheduleRegistry;

use crate::loader::{ScheduleLoader, ScheduleLoaderError};

/// Tables shipped with the crate. Figures are illustrative, not official.
pub const BUILTIN_BRACKETS: &str = include_str!("../data/brackets.csv");
pub const BUILTIN_JURISDICTIONS: &str = include_str!("../data/jurisdictions.csv");
pub const BUILTIN_LIMITS: &str = include_str!("../data/limits.csv");

/// Builds a registry from the shipped tables.
///
/// # Errors
///
/// Only if the shipped tables are corrupt; the integration tests load them.
pub fn builtin_registry() -> Result<ScheduleRegistry, ScheduleLoaderError> {
    let (registry, _) = ScheduleLoader::registry_from_readers(
        BUILTIN_BRACKETS.as_bytes(),
        BUILTIN_JURISDICTIONS.as_bytes(),
        BUILTIN_LIMITS.as_bytes(),
    )?;
    Ok(registry)
}
