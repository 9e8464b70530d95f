//! Route briefing, timeline and request/response models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{
    AirportAssessment, BriefingCategory, ChangeKind, GeoPoint, NotamRecord, ParsedObservation,
    PirepRecord, RawReport, TafForecast,
};
use crate::flight_category::FlightCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Moderate,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Minimal => write!(f, "MINIMAL"),
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Moderate => write!(f, "MODERATE"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Route-level synthesis of all airport assessments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteBriefing {
    pub overall_category: BriefingCategory,
    pub risk_level: RiskLevel,
    pub executive_summary: String,
    pub decision_factors: Vec<String>,
    pub pilot_recommendations: Vec<String>,
    /// SIGNIFICANT or SEVERE airports in route order, each listed once
    pub critical_airports: Vec<String>,
    pub insufficient_data: bool,
}

/// Chart icon tag for a timeline point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherIcon {
    Thunderstorm,
    Precipitation,
    Fog,
    Overcast,
    Clear,
}

/// One sample of the forecast series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    pub time: DateTime<Utc>,
    /// Airport governing this instant
    pub location: String,
    pub visibility_sm: f64,
    pub temperature_c: f64,
    pub dewpoint_c: Option<f64>,
    pub wind_speed_kt: f64,
    pub wind_direction_deg: Option<u16>,
    pub weather_description: String,
    pub cloud_description: String,
    pub weather_icon: WeatherIcon,
    pub flight_category: FlightCategory,
    /// `None` when the point comes from the METAR
    pub change_kind: Option<ChangeKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from: String,
    pub to: String,
    pub distance_nm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteMetadata {
    pub total_distance_nm: f64,
    pub departure_airport: String,
    pub arrival_airport: String,
    /// Intermediate airports between departure and arrival
    pub waypoints_count: usize,
    pub legs: Vec<RouteLeg>,
    pub route_center: GeoPoint,
    pub cruise_altitude_ft: Option<u32>,
    pub aircraft_type: Option<String>,
}

/// A report either decoded or carried through as unavailable
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReportEntry<T> {
    Parsed {
        raw: String,
        record: T,
        /// Simplified English rendering
        plain_language: String,
    },
    Unavailable {
        raw: String,
        reason: String,
    },
}

impl<T> ReportEntry<T> {
    #[must_use]
    pub fn record(&self) -> Option<&T> {
        match self {
            ReportEntry::Parsed { record, .. } => Some(record),
            ReportEntry::Unavailable { .. } => None,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, ReportEntry::Parsed { .. })
    }
}

/// Everything known about one route airport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirportReport {
    pub airport: String,
    pub assessment: AirportAssessment,
    pub metars: Vec<ReportEntry<ParsedObservation>>,
    pub tafs: Vec<ReportEntry<TafForecast>>,
    /// Recent reports, newest and most severe first
    pub pireps: Vec<ReportEntry<PirepRecord>>,
    pub notams: Vec<ReportEntry<NotamRecord>>,
}

/// Input of one briefing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BriefingRequest {
    /// Ordered ICAO codes, departure first
    pub route: Vec<String>,
    pub reports: Vec<RawReport>,
    /// Defaults to the analysis time
    pub departure_time: Option<DateTime<Utc>>,
    pub cruise_altitude_ft: Option<u32>,
    pub aircraft_type: Option<String>,
}

impl BriefingRequest {
    #[must_use]
    pub fn new(route: Vec<String>, reports: Vec<RawReport>) -> Self {
        Self {
            route,
            reports,
            departure_time: None,
            cruise_altitude_ft: None,
            aircraft_type: None,
        }
    }

    #[must_use]
    pub fn with_departure_time(mut self, departure_time: DateTime<Utc>) -> Self {
        self.departure_time = Some(departure_time);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BriefingResponse {
    pub generated_at: DateTime<Utc>,
    pub departure_time: DateTime<Utc>,
    /// Route order
    pub airports: Vec<AirportReport>,
    pub briefing: RouteBriefing,
    pub timeline: Vec<TimelinePoint>,
    pub metadata: RouteMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_entry_serialization() {
        let entry: ReportEntry<u32> = ReportEntry::Unavailable {
            raw: "TAF KJFK".to_string(),
            reason: "missing validity window".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert!(entry.record().is_none());
        assert!(!entry.is_available());
    }

    #[test]
    fn test_risk_level_order() {
        assert!(RiskLevel::High > RiskLevel::Moderate);
        assert!(RiskLevel::Low > RiskLevel::Minimal);
        assert_eq!(serde_json::to_string(&WeatherIcon::Thunderstorm).unwrap(), "\"thunderstorm\"");
    }
}
