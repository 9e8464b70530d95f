//! Report parser for METAR, TAF, PIREP and NOTAM text
//!
//! Each raw report is decoded independently. A report whose mandatory groups are
//! missing fails with [`SkyBriefError::Parse`](crate::SkyBriefError::Parse) without
//! affecting any other report; optional groups that are absent simply stay `None`.

pub mod metar;
pub mod notam;
pub mod pirep;
pub mod taf;
pub mod tokens;

use chrono::{DateTime, Utc};

use crate::Result;
use crate::models::{
    NotamRecord, ParsedObservation, ParsedReport, PirepRecord, RawReport, ReportType, TafForecast,
};

/// Decodes raw report text relative to a reference time.
///
/// Day/time groups carry no month or year, so they are resolved to the calendar
/// month nearest the report's issue time, or the reference time when unknown.
/// PIREP ages are measured against the reference time.
#[derive(Debug, Clone, Copy)]
pub struct ReportParser {
    reference_time: DateTime<Utc>,
}

impl ReportParser {
    #[must_use]
    pub fn new(reference_time: DateTime<Utc>) -> Self {
        Self { reference_time }
    }

    #[must_use]
    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    /// Decode one report of the given type
    pub fn parse(&self, raw_text: &str, report_type: ReportType) -> Result<ParsedReport> {
        self.parse_anchored(raw_text, report_type, self.reference_time)
    }

    /// Decode a [`RawReport`], anchoring time groups on its issue time when known
    pub fn parse_raw(&self, report: &RawReport) -> Result<ParsedReport> {
        let anchor = report.issue_time.unwrap_or(self.reference_time);
        self.parse_anchored(&report.raw_text, report.report_type, anchor)
    }

    fn parse_anchored(
        &self,
        raw_text: &str,
        report_type: ReportType,
        anchor: DateTime<Utc>,
    ) -> Result<ParsedReport> {
        match report_type {
            ReportType::Metar => metar::parse(raw_text, anchor).map(ParsedReport::Metar),
            ReportType::Taf => taf::parse(raw_text, anchor).map(ParsedReport::Taf),
            ReportType::Pirep => {
                pirep::parse(raw_text, self.reference_time).map(ParsedReport::Pirep)
            }
            ReportType::Notam => notam::parse(raw_text).map(ParsedReport::Notam),
        }
    }

    pub fn parse_metar(&self, raw_text: &str) -> Result<ParsedObservation> {
        metar::parse(raw_text, self.reference_time)
    }

    pub fn parse_taf(&self, raw_text: &str) -> Result<TafForecast> {
        taf::parse(raw_text, self.reference_time)
    }

    pub fn parse_pirep(&self, raw_text: &str) -> Result<PirepRecord> {
        pirep::parse(raw_text, self.reference_time)
    }

    pub fn parse_notam(&self, raw_text: &str) -> Result<NotamRecord> {
        notam::parse(raw_text)
    }
}
