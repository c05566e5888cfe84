//! Shared primitive types and closed enumerations used across the pipeline.
//!
//! RULE: Every categorical survey field is a closed enum.
//! Raw text is parsed once, in the record store. Nothing downstream
//! ever compares strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of one surveyed individual (the join key).
pub type RespondentId = String;

/// Score bounds for financial literacy.
pub const LITERACY_MIN: f64 = 0.0;
pub const LITERACY_MAX: f64 = 100.0;

// ── Province ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Province {
    KigaliCity,
    Northern,
    Southern,
    Eastern,
    Western,
}

impl Province {
    pub const ALL: [Province; 5] = [
        Self::KigaliCity,
        Self::Northern,
        Self::Southern,
        Self::Eastern,
        Self::Western,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::KigaliCity => "Kigali City",
            Self::Northern => "Northern",
            Self::Southern => "Southern",
            Self::Eastern => "Eastern",
            Self::Western => "Western",
        }
    }

    /// Accepts the survey spellings ("Kigali", "Northern Province", "north", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        let key = normalize(raw);
        let key = key.strip_suffix(" province").unwrap_or(&key);
        match key {
            "kigali" | "kigali city" => Some(Self::KigaliCity),
            "north" | "northern" => Some(Self::Northern),
            "south" | "southern" => Some(Self::Southern),
            "east" | "eastern" => Some(Self::Eastern),
            "west" | "western" => Some(Self::Western),
            _ => None,
        }
    }
}

// ── Area ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaType {
    Urban,
    Rural,
}

impl AreaType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Urban => "Urban",
            Self::Rural => "Rural",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "urban" => Some(Self::Urban),
            "rural" => Some(Self::Rural),
            _ => None,
        }
    }
}

// ── Gender ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "m" | "male" => Some(Self::Male),
            "f" | "female" => Some(Self::Female),
            _ => None,
        }
    }
}

// ── Education ─────────────────────────────────────────────────────

/// Highest completed education level. Ordinal: variant order is rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    NoFormal,
    Primary,
    Secondary,
    Vocational,
    Tertiary,
}

impl EducationLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoFormal => "No Formal",
            Self::Primary => "Primary",
            Self::Secondary => "Secondary",
            Self::Vocational => "Vocational",
            Self::Tertiary => "Tertiary",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize(raw).as_str() {
            "none" | "no formal" | "no formal education" | "no_formal" => Some(Self::NoFormal),
            "primary" => Some(Self::Primary),
            "secondary" => Some(Self::Secondary),
            "vocational" | "tvet" => Some(Self::Vocational),
            "tertiary" | "university" => Some(Self::Tertiary),
            _ => None,
        }
    }
}

/// Coarse education grouping used for aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationBucket {
    Basic,
    Intermediate,
    Advanced,
}

impl EducationBucket {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

// ── Age group ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "18-25")]
    UpTo25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46-55")]
    From46To55,
    #[serde(rename = "56+")]
    Over55,
}

impl AgeGroup {
    pub fn label(&self) -> &'static str {
        match self {
            Self::UpTo25 => "18-25",
            Self::From26To35 => "26-35",
            Self::From36To45 => "36-45",
            Self::From46To55 => "46-55",
            Self::Over55 => "56+",
        }
    }
}

// ── Income bracket ────────────────────────────────────────────────

/// Monthly income quintile within the cleaned population. Q1 is lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IncomeBracket {
    Q1,
    Q2,
    Q3,
    Q4,
    Q5,
}

impl IncomeBracket {
    pub const ALL: [IncomeBracket; 5] = [Self::Q1, Self::Q2, Self::Q3, Self::Q4, Self::Q5];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
            Self::Q5 => "Q5",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(
    Province,
    AreaType,
    Gender,
    EducationLevel,
    EducationBucket,
    AgeGroup,
    IncomeBracket
);

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn province_accepts_survey_spellings() {
        assert_eq!(Province::parse("Kigali"), Some(Province::KigaliCity));
        assert_eq!(Province::parse("  kigali city "), Some(Province::KigaliCity));
        assert_eq!(Province::parse("Northern Province"), Some(Province::Northern));
        assert_eq!(Province::parse("west"), Some(Province::Western));
        assert_eq!(Province::parse("Atlantis"), None);
    }

    #[test]
    fn education_levels_are_ordered_by_rank() {
        assert!(EducationLevel::NoFormal < EducationLevel::Primary);
        assert!(EducationLevel::Vocational < EducationLevel::Tertiary);
        assert_eq!(EducationLevel::parse("University"), Some(EducationLevel::Tertiary));
    }

    #[test]
    fn labels_round_trip_through_parse() {
        for p in Province::ALL {
            assert_eq!(Province::parse(p.label()), Some(p));
        }
        assert_eq!(Gender::parse(Gender::Female.label()), Some(Gender::Female));
        assert_eq!(AreaType::parse(AreaType::Rural.label()), Some(AreaType::Rural));
    }
}
