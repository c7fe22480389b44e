//! Taxpayer profiles stored as TOML.
//!
//! Keys use the same camelCase names as the JSON form. Amounts may be
//! quoted decimals (`"1234.50"`) or whole numbers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use swisstax_core::TaxpayerProfile;

/// Parses a profile from TOML text. Only the shape is checked here; the
/// engine validates values.
pub fn parse_profile(text: &str) -> Result<TaxpayerProfile, toml::de::Error> {
    toml::from_str(text)
}

pub fn load_profile(path: &Path) -> Result<TaxpayerProfile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read profile: {}", path.display()))?;
    parse_profile(&text).with_context(|| format!("Failed to parse profile: {}", path.display()))
}
