use std::fmt;

use serde::{Deserialize, Serialize};

/// The 26 Swiss cantons, identified by their official two-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Canton {
    Ag,
    Ai,
    Ar,
    Be,
    Bl,
    Bs,
    Fr,
    Ge,
    Gl,
    Gr,
    Ju,
    Lu,
    Ne,
    Nw,
    Ow,
    Sg,
    Sh,
    So,
    Sz,
    Tg,
    Ti,
    Ur,
    Vd,
    Vs,
    Zg,
    Zh,
}

impl Canton {
    pub const ALL: [Canton; 26] = [
        Self::Ag,
        Self::Ai,
        Self::Ar,
        Self::Be,
        Self::Bl,
        Self::Bs,
        Self::Fr,
        Self::Ge,
        Self::Gl,
        Self::Gr,
        Self::Ju,
        Self::Lu,
        Self::Ne,
        Self::Nw,
        Self::Ow,
        Self::Sg,
        Self::Sh,
        Self::So,
        Self::Sz,
        Self::Tg,
        Self::Ti,
        Self::Ur,
        Self::Vd,
        Self::Vs,
        Self::Zg,
        Self::Zh,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Ag => "AG",
            Self::Ai => "AI",
            Self::Ar => "AR",
            Self::Be => "BE",
            Self::Bl => "BL",
            Self::Bs => "BS",
            Self::Fr => "FR",
            Self::Ge => "GE",
            Self::Gl => "GL",
            Self::Gr => "GR",
            Self::Ju => "JU",
            Self::Lu => "LU",
            Self::Ne => "NE",
            Self::Nw => "NW",
            Self::Ow => "OW",
            Self::Sg => "SG",
            Self::Sh => "SH",
            Self::So => "SO",
            Self::Sz => "SZ",
            Self::Tg => "TG",
            Self::Ti => "TI",
            Self::Ur => "UR",
            Self::Vd => "VD",
            Self::Vs => "VS",
            Self::Zg => "ZG",
            Self::Zh => "ZH",
        }
    }

    /// Parses a canton code, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL.into_iter().find(|canton| canton.code() == code)
    }
}

impl fmt::Display for Canton {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.code())
    }
}
