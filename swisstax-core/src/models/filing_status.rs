use std::fmt;

use serde::{Deserialize, Serialize};

/// Civil status declared on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    Married,
    RegisteredPartnership,
}

impl FilingStatus {
    /// Registered partners are taxed exactly like married couples.
    pub fn filing_mode(&self) -> FilingMode {
        match self {
            Self::Single => FilingMode::Single,
            Self::Married | Self::RegisteredPartnership => FilingMode::Married,
        }
    }

    pub fn is_joint(&self) -> bool {
        self.filing_mode() == FilingMode::Married
    }
}

/// The tariff a schedule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingMode {
    Single,
    Married,
}

impl FilingMode {
    pub const ALL: [FilingMode; 2] = [Self::Single, Self::Married];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Some(Self::Single),
            "married" => Some(Self::Married),
            _ => None,
        }
    }
}

impl fmt::Display for FilingMode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
