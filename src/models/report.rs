//! Raw report input model and the parsed report union

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{NotamRecord, ParsedObservation, PirepRecord, TafForecast};

/// Kind of aviation text product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportType {
    Metar,
    Taf,
    Pirep,
    Notam,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Metar => write!(f, "METAR"),
            ReportType::Taf => write!(f, "TAF"),
            ReportType::Pirep => write!(f, "PIREP"),
            ReportType::Notam => write!(f, "NOTAM"),
        }
    }
}

/// Raw report text as received from the weather service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReport {
    pub report_type: ReportType,
    /// Airport the report was requested for
    pub station: String,
    pub raw_text: String,
    /// Issue time supplied by the upstream service, if known
    pub issue_time: Option<DateTime<Utc>>,
}

impl RawReport {
    /// Create a new raw report
    #[must_use]
    pub fn new(report_type: ReportType, station: &str, raw_text: &str) -> Self {
        Self {
            report_type,
            station: station.trim().to_uppercase(),
            raw_text: raw_text.trim().to_string(),
            issue_time: None,
        }
    }

    #[must_use]
    pub fn metar(station: &str, raw_text: &str) -> Self {
        Self::new(ReportType::Metar, station, raw_text)
    }

    #[must_use]
    pub fn taf(station: &str, raw_text: &str) -> Self {
        Self::new(ReportType::Taf, station, raw_text)
    }

    #[must_use]
    pub fn pirep(station: &str, raw_text: &str) -> Self {
        Self::new(ReportType::Pirep, station, raw_text)
    }

    #[must_use]
    pub fn notam(station: &str, raw_text: &str) -> Self {
        Self::new(ReportType::Notam, station, raw_text)
    }

    /// Attach the upstream issue time
    #[must_use]
    pub fn with_issue_time(mut self, issue_time: DateTime<Utc>) -> Self {
        self.issue_time = Some(issue_time);
        self
    }
}

/// Structured record produced by the report parser
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "record", rename_all = "UPPERCASE")]
pub enum ParsedReport {
    Metar(ParsedObservation),
    Taf(TafForecast),
    Pirep(PirepRecord),
    Notam(NotamRecord),
}

impl ParsedReport {
    #[must_use]
    pub fn report_type(&self) -> ReportType {
        match self {
            ParsedReport::Metar(_) => ReportType::Metar,
            ParsedReport::Taf(_) => ReportType::Taf,
            ParsedReport::Pirep(_) => ReportType::Pirep,
            ParsedReport::Notam(_) => ReportType::Notam,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_report_normalizes_station() {
        let report =
            RawReport::metar(" kjfk ", "  METAR KJFK 121851Z 31012KT 10SM CLR 18/06 A3012 ");
        assert_eq!(report.station, "KJFK");
        assert!(report.raw_text.starts_with("METAR"));
        assert!(report.issue_time.is_none());
    }

    #[test]
    fn test_report_type_display() {
        assert_eq!(ReportType::Metar.to_string(), "METAR");
        assert_eq!(ReportType::Notam.to_string(), "NOTAM");
        assert_eq!(serde_json::to_string(&ReportType::Taf).unwrap(), "\"TAF\"");
    }
}
