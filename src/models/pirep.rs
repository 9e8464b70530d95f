//! Pilot report model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Routine (UA) or urgent (UUA) pilot report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PirepKind {
    Ua,
    Uua,
}

/// Reported intensity, ordered from negative to extreme
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PirepIntensity {
    Neg,
    Trace,
    Lgt,
    Mod,
    Sev,
    Extrm,
}

impl PirepIntensity {
    /// Intensity word at the start of a `/TB` or `/IC` group
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "NEG" | "NIL" | "SMTH" | "SMOOTH" => Some(PirepIntensity::Neg),
            "TRACE" | "TRC" => Some(PirepIntensity::Trace),
            "LGT" | "LIGHT" => Some(PirepIntensity::Lgt),
            "MOD" | "MODERATE" => Some(PirepIntensity::Mod),
            "SEV" | "SEVERE" => Some(PirepIntensity::Sev),
            "EXTRM" | "EXTREME" => Some(PirepIntensity::Extrm),
            _ => None,
        }
    }

    /// Ordinal score 0 (NEG) to 5 (EXTRM)
    #[must_use]
    pub fn score(&self) -> u8 {
        match self {
            PirepIntensity::Neg => 0,
            PirepIntensity::Trace => 1,
            PirepIntensity::Lgt => 2,
            PirepIntensity::Mod => 3,
            PirepIntensity::Sev => 4,
            PirepIntensity::Extrm => 5,
        }
    }
}

impl fmt::Display for PirepIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PirepIntensity::Neg => write!(f, "none"),
            PirepIntensity::Trace => write!(f, "trace"),
            PirepIntensity::Lgt => write!(f, "light"),
            PirepIntensity::Mod => write!(f, "moderate"),
            PirepIntensity::Sev => write!(f, "severe"),
            PirepIntensity::Extrm => write!(f, "extreme"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TurbulenceType {
    Cat,
    Chop,
    Llws,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum IcingType {
    Rime,
    Clr,
    Mxd,
}

impl fmt::Display for TurbulenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurbulenceType::Cat => write!(f, "CAT"),
            TurbulenceType::Chop => write!(f, "CHOP"),
            TurbulenceType::Llws => write!(f, "LLWS"),
        }
    }
}

impl fmt::Display for IcingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcingType::Rime => write!(f, "rime"),
            IcingType::Clr => write!(f, "clear"),
            IcingType::Mxd => write!(f, "mixed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurbulenceReport {
    pub intensity: PirepIntensity,
    pub kind: Option<TurbulenceType>,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcingReport {
    pub intensity: PirepIntensity,
    pub kind: Option<IcingType>,
    pub raw: String,
}

/// Decoded pilot report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PirepRecord {
    pub kind: PirepKind,
    /// `/OV` location
    pub location: Option<String>,
    pub reported_time: Option<DateTime<Utc>>,
    pub aircraft_type: Option<String>,
    pub altitude_ft: Option<u32>,
    pub turbulence: Option<TurbulenceReport>,
    pub icing: Option<IcingReport>,
    /// `/SK` text
    pub sky: Option<String>,
    /// `/WX` text
    pub weather: Option<String>,
    /// Low-level wind shear reported in `/TB`, `/WS` or remarks
    pub wind_shear: bool,
    pub remarks: Option<String>,
    /// Hours between the report time and the parser reference time
    pub age_hours: Option<f64>,
    /// Highest reported intensity, 0 to 5
    pub severity_score: u8,
}

impl PirepRecord {
    /// Reports with an unknown time are treated as current
    #[must_use]
    pub fn is_recent(&self, max_age_hours: f64) -> bool {
        self.age_hours.is_none_or(|age| age <= max_age_hours)
    }

    #[must_use]
    pub fn is_urgent(&self) -> bool {
        self.kind == PirepKind::Uua
    }
}
