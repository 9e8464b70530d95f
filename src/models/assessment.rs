//! Per-airport assessment model

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::flight_category::FlightCategory;

/// Briefing severity of one airport or of the whole route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BriefingCategory {
    Clear,
    Significant,
    Severe,
    Unknown,
}

impl BriefingCategory {
    /// Severity rank, `None` for UNKNOWN
    #[must_use]
    pub fn rank(&self) -> Option<u8> {
        match self {
            BriefingCategory::Clear => Some(0),
            BriefingCategory::Significant => Some(1),
            BriefingCategory::Severe => Some(2),
            BriefingCategory::Unknown => None,
        }
    }

    /// SIGNIFICANT or SEVERE
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(self, BriefingCategory::Significant | BriefingCategory::Severe)
    }
}

impl fmt::Display for BriefingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BriefingCategory::Clear => write!(f, "CLEAR"),
            BriefingCategory::Significant => write!(f, "SIGNIFICANT"),
            BriefingCategory::Severe => write!(f, "SEVERE"),
            BriefingCategory::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Hazard kinds in descending severity order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardKind {
    Thunderstorm,
    Icing,
    Turbulence,
    WindShear,
    StrongWind,
    LowVisibility,
    LowCeiling,
    HeavyPrecipitation,
    NotamRestriction,
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HazardKind::Thunderstorm => write!(f, "thunderstorm"),
            HazardKind::Icing => write!(f, "icing"),
            HazardKind::Turbulence => write!(f, "turbulence"),
            HazardKind::WindShear => write!(f, "wind shear"),
            HazardKind::StrongWind => write!(f, "strong wind"),
            HazardKind::LowVisibility => write!(f, "low visibility"),
            HazardKind::LowCeiling => write!(f, "low ceiling"),
            HazardKind::HeavyPrecipitation => write!(f, "heavy precipitation"),
            HazardKind::NotamRestriction => write!(f, "NOTAM restriction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HazardLevel {
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hazard {
    pub kind: HazardKind,
    pub level: HazardLevel,
    pub description: String,
}

impl Hazard {
    #[must_use]
    pub fn new<S: Into<String>>(kind: HazardKind, level: HazardLevel, description: S) -> Self {
        Self {
            kind,
            level,
            description: description.into(),
        }
    }
}

/// Which report the airport classification was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrimarySource {
    Metar,
    Taf,
    None,
}

impl fmt::Display for PrimarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimarySource::Metar => write!(f, "METAR"),
            PrimarySource::Taf => write!(f, "TAF"),
            PrimarySource::None => write!(f, "NONE"),
        }
    }
}

/// Classification and hazards of one route airport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportAssessment {
    pub airport: String,
    pub category: BriefingCategory,
    pub flight_category: FlightCategory,
    pub primary_source: PrimarySource,
    /// Most severe first
    pub hazards: Vec<Hazard>,
    pub key_factors: Vec<String>,
    pub issues: Vec<String>,
}

impl AirportAssessment {
    #[must_use]
    pub fn high_hazard_count(&self) -> usize {
        self.hazards
            .iter()
            .filter(|hazard| hazard.level == HazardLevel::High)
            .count()
    }

    #[must_use]
    pub fn has_hazard(&self, kind: HazardKind) -> bool {
        self.hazards.iter().any(|hazard| hazard.kind == kind)
    }
}
