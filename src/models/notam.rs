//! Notice to airmen model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotamCategory {
    Runway,
    Navigation,
    Lighting,
    Airspace,
    Construction,
    WeatherServices,
    Other,
}

impl NotamCategory {
    /// Categories whose closures restrict departure and arrival operations
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            NotamCategory::Runway | NotamCategory::Navigation | NotamCategory::Lighting
        )
    }
}

impl fmt::Display for NotamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotamCategory::Runway => write!(f, "runway"),
            NotamCategory::Navigation => write!(f, "navigation"),
            NotamCategory::Lighting => write!(f, "lighting"),
            NotamCategory::Airspace => write!(f, "airspace"),
            NotamCategory::Construction => write!(f, "construction"),
            NotamCategory::WeatherServices => write!(f, "weather services"),
            NotamCategory::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NotamSeverity {
    Low,
    Medium,
    High,
}

/// Interpreted NOTAM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotamRecord {
    pub id: String,
    pub category: NotamCategory,
    pub severity: NotamSeverity,
    pub start_time: Option<DateTime<Utc>>,
    /// `None` for permanent notices
    pub end_time: Option<DateTime<Utc>>,
    pub summary: String,
    pub affects_operations: bool,
    pub raw_text: String,
}

impl NotamRecord {
    /// Whether the notice is in force at some point of `[from, to]`
    #[must_use]
    pub fn is_active_during(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        let started = self.start_time.is_none_or(|start| start <= to);
        let not_ended = self.end_time.is_none_or(|end| end >= from);
        started && not_ended
    }
}
