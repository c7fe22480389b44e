use std::fmt;

use serde::{Deserialize, Serialize};

use super::Canton;

/// A taxing authority that owns bracket schedules.
///
/// Communal and confessional taxes have no schedules of their own; they are
/// coefficients on the cantonal simple tax and live in
/// [`JurisdictionConfig`](super::JurisdictionConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Jurisdiction {
    Federal,
    Canton(Canton),
}

impl Jurisdiction {
    pub const FEDERAL_CODE: &'static str = "CH";

    pub fn code(&self) -> &'static str {
        match self {
            Self::Federal => Self::FEDERAL_CODE,
            Self::Canton(canton) => canton.code(),
        }
    }

    /// Parses `CH` (federal) or a canton code.
    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case(Self::FEDERAL_CODE) {
            return Some(Self::Federal);
        }
        Canton::parse(s).map(Self::Canton)
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// What a schedule is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxBase {
    Income,
    Wealth,
}

impl TaxBase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Wealth => "wealth",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Some(Self::Income),
            "wealth" => Some(Self::Wealth),
            _ => None,
        }
    }
}

impl fmt::Display for TaxBase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
