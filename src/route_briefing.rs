//! Route briefing pipeline
//!
//! Validates the route, decodes every report, assesses each airport, and
//! assembles the synthesized briefing, the forecast timeline and the route
//! metadata into one [`BriefingResponse`].

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::briefing::{BriefingSynthesizer, RouteContext};
use crate::config::SkyBriefConfig;
use crate::distance::AirportDirectory;
use crate::flight_category::FlightCategory;
use crate::hazards::{HazardDetector, HazardInputs};
use crate::models::{
    AirportAssessment, AirportReport, BriefingCategory, BriefingRequest, BriefingResponse,
    NotamRecord, ObservationFields, ParsedObservation, ParsedReport, PirepRecord, PrimarySource,
    RawReport, ReportEntry, ReportType, RouteMetadata, TafForecast,
};
use crate::parser::ReportParser;
use crate::plain_language;
use crate::route::validate_route;
use crate::timeline::{AirportTimelineInput, TimelineBuilder};
use crate::{Result, SkyBriefError};

/// Decoded reports of one airport, before assessment
#[derive(Debug, Default)]
struct CollectedReports {
    metars: Vec<ReportEntry<ParsedObservation>>,
    tafs: Vec<ReportEntry<TafForecast>>,
    pireps: Vec<ReportEntry<PirepRecord>>,
    notams: Vec<ReportEntry<NotamRecord>>,
}

impl CollectedReports {
    /// Most recent decoded METAR
    fn latest_metar(&self) -> Option<&ParsedObservation> {
        self.metars
            .iter()
            .filter_map(ReportEntry::record)
            .max_by_key(|metar| metar.reference_time)
    }

    /// Most recently issued decoded TAF
    fn latest_taf(&self) -> Option<&TafForecast> {
        self.tafs
            .iter()
            .filter_map(ReportEntry::record)
            .max_by_key(|taf| taf.issue_time.unwrap_or(taf.valid_from))
    }

    fn pirep_records(&self) -> Vec<PirepRecord> {
        self.pireps
            .iter()
            .filter_map(ReportEntry::record)
            .cloned()
            .collect()
    }

    fn notam_records(&self) -> Vec<NotamRecord> {
        self.notams
            .iter()
            .filter_map(ReportEntry::record)
            .cloned()
            .collect()
    }

    /// One issue line per report that could not be decoded
    fn unavailable_issues(&self) -> Vec<String> {
        fn reasons<T>(
            report_type: ReportType,
            entries: &[ReportEntry<T>],
        ) -> impl Iterator<Item = String> + '_ {
            entries.iter().filter_map(move |entry| match entry {
                ReportEntry::Unavailable { reason, .. } => {
                    Some(format!("{report_type} unavailable: {reason}"))
                }
                ReportEntry::Parsed { .. } => None,
            })
        }
        reasons(ReportType::Metar, &self.metars)
            .chain(reasons(ReportType::Taf, &self.tafs))
            .chain(reasons(ReportType::Pirep, &self.pireps))
            .chain(reasons(ReportType::Notam, &self.notams))
            .collect()
    }
}

fn parsed<T>(raw: &RawReport, record: T, render: fn(&T) -> String) -> ReportEntry<T> {
    ReportEntry::Parsed {
        raw: raw.raw_text.clone(),
        plain_language: render(&record),
        record,
    }
}

/// Conditions the airport is classified from
struct Governing {
    fields: Option<ObservationFields>,
    source: PrimarySource,
}

/// TAF at departure when departing later and covered, else the METAR, else the
/// TAF clamped into its validity
fn select_governing(
    metar: Option<&ParsedObservation>,
    taf: Option<&TafForecast>,
    departure: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Governing {
    if departure > now {
        if let Some(resolved) = taf.and_then(|taf| taf.conditions_at(departure)) {
            return Governing {
                fields: Some(resolved.fields),
                source: PrimarySource::Taf,
            };
        }
    }
    if let Some(metar) = metar {
        return Governing {
            fields: Some(metar.fields.clone()),
            source: PrimarySource::Metar,
        };
    }
    match taf.and_then(|taf| taf.conditions_nearest(departure)) {
        Some(resolved) => Governing {
            fields: Some(resolved.fields),
            source: PrimarySource::Taf,
        },
        None => Governing {
            fields: None,
            source: PrimarySource::None,
        },
    }
}

/// Recent PIREPs first by time (newest first), then by severity; undecoded last
fn order_pireps(entries: &mut Vec<ReportEntry<PirepRecord>>, max_age_hours: f64) {
    entries.retain(|entry| entry.record().is_none_or(|pirep| pirep.is_recent(max_age_hours)));
    entries.sort_by(|a, b| match (a.record(), b.record()) {
        (Some(a), Some(b)) => b
            .reported_time
            .cmp(&a.reported_time)
            .then(b.severity_score.cmp(&a.severity_score)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Synchronous briefing engine over a coordinate directory
#[derive(Debug, Clone)]
pub struct RouteBriefingService {
    config: SkyBriefConfig,
    directory: AirportDirectory,
}

impl Default for RouteBriefingService {
    fn default() -> Self {
        Self::new(&SkyBriefConfig::default(), AirportDirectory::builtin())
    }
}

impl RouteBriefingService {
    #[must_use]
    pub fn new(config: &SkyBriefConfig, directory: AirportDirectory) -> Self {
        Self {
            config: config.clone(),
            directory,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &AirportDirectory {
        &self.directory
    }

    /// Briefing relative to the current time
    pub fn generate(&self, request: &BriefingRequest) -> Result<BriefingResponse> {
        self.generate_at(request, Utc::now())
    }

    /// Briefing with `now` as the analysis time.
    ///
    /// Fails with `Validation` for a malformed route and `AirportNotFound` when any
    /// route airport is missing from the directory. Report-level failures never
    /// fail the briefing; they show up as unavailable entries and issues.
    #[tracing::instrument(skip_all, fields(route = ?request.route))]
    pub fn generate_at(
        &self,
        request: &BriefingRequest,
        now: DateTime<Utc>,
    ) -> Result<BriefingResponse> {
        let route = validate_route(&request.route)?;
        for code in &route {
            self.directory.lookup(code)?;
        }
        let legs = self.directory.route_legs(&route)?;
        let route_center = self.directory.route_center(&route)?;
        let departure = request.departure_time.unwrap_or(now);
        info!(airports = route.len(), %departure, "Generating route briefing");

        let parser = ReportParser::new(now);
        let mut collected: Vec<CollectedReports> =
            route.iter().map(|_| CollectedReports::default()).collect();
        for report in &request.reports {
            let station = report.station.trim().to_uppercase();
            // a round trip visits the same airport more than once
            let positions: Vec<usize> = route
                .iter()
                .enumerate()
                .filter(|(_, code)| **code == station)
                .map(|(index, _)| index)
                .collect();
            if positions.is_empty() {
                debug!(%station, "Ignoring report for an airport off the route");
                continue;
            }
            for index in positions {
                Self::collect(&parser, report, &mut collected[index]);
            }
        }
        for reports in &mut collected {
            order_pireps(&mut reports.pireps, self.config.hazards.pirep_max_age_hours);
        }

        let assessments: Vec<AirportAssessment> = route
            .iter()
            .zip(&collected)
            .map(|(airport, reports)| self.assess_airport(airport, reports, departure, now))
            .collect();

        let briefing = BriefingSynthesizer::new(&self.config.briefing)
            .synthesize(&assessments, &RouteContext::new(&route));

        let mut cumulative_nm = 0.0;
        let mut route_distances = vec![0.0];
        for leg in &legs {
            cumulative_nm += leg.distance_nm;
            route_distances.push(cumulative_nm);
        }
        let timeline_inputs: Vec<AirportTimelineInput<'_>> = route
            .iter()
            .zip(&collected)
            .zip(&route_distances)
            .map(|((airport, reports), distance)| AirportTimelineInput {
                airport,
                taf: reports.latest_taf(),
                metar: reports.latest_metar().map(|metar| &metar.fields),
                route_distance_nm: *distance,
            })
            .collect();
        let timeline =
            TimelineBuilder::new(&self.config.timeline).build(departure, &timeline_inputs);

        let metadata = RouteMetadata {
            total_distance_nm: cumulative_nm,
            departure_airport: route[0].clone(),
            arrival_airport: route[route.len() - 1].clone(),
            waypoints_count: route.len().saturating_sub(2),
            legs,
            route_center,
            cruise_altitude_ft: request.cruise_altitude_ft,
            aircraft_type: request.aircraft_type.clone(),
        };

        let airports: Vec<AirportReport> = route
            .iter()
            .zip(collected)
            .zip(assessments)
            .map(|((airport, reports), assessment)| AirportReport {
                airport: airport.clone(),
                assessment,
                metars: reports.metars,
                tafs: reports.tafs,
                pireps: reports.pireps,
                notams: reports.notams,
            })
            .collect();

        info!(
            category = %briefing.overall_category,
            risk = %briefing.risk_level,
            timeline_points = timeline.len(),
            distance_nm = metadata.total_distance_nm,
            "Route briefing complete"
        );

        Ok(BriefingResponse {
            generated_at: now,
            departure_time: departure,
            airports,
            briefing,
            timeline,
            metadata,
        })
    }

    /// Decode one report into the airport's collection, degrading failures
    fn collect(parser: &ReportParser, report: &RawReport, reports: &mut CollectedReports) {
        match parser.parse_raw(report) {
            Ok(ParsedReport::Metar(record)) => {
                reports.metars.push(parsed(report, record, plain_language::metar));
            }
            Ok(ParsedReport::Taf(record)) => {
                reports.tafs.push(parsed(report, record, plain_language::taf));
            }
            Ok(ParsedReport::Pirep(record)) => {
                reports.pireps.push(parsed(report, record, plain_language::pirep));
            }
            Ok(ParsedReport::Notam(record)) => {
                let summary = record.summary.clone();
                reports.notams.push(ReportEntry::Parsed {
                    raw: report.raw_text.clone(),
                    record,
                    plain_language: summary,
                });
            }
            Err(err) => {
                warn!(
                    station = %report.station,
                    report_type = %report.report_type,
                    error = %err,
                    "Report unavailable"
                );
                let raw = report.raw_text.clone();
                let reason = match &err {
                    SkyBriefError::Parse { reason, .. } => reason.clone(),
                    other => other.to_string(),
                };
                match report.report_type {
                    ReportType::Metar => {
                        reports.metars.push(ReportEntry::Unavailable { raw, reason });
                    }
                    ReportType::Taf => reports.tafs.push(ReportEntry::Unavailable { raw, reason }),
                    ReportType::Pirep => {
                        reports.pireps.push(ReportEntry::Unavailable { raw, reason });
                    }
                    ReportType::Notam => {
                        reports.notams.push(ReportEntry::Unavailable { raw, reason });
                    }
                }
            }
        }
    }

    /// Classification, hazards and key factors of one airport
    fn assess_airport(
        &self,
        airport: &str,
        reports: &CollectedReports,
        departure: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AirportAssessment {
        let metar = reports.latest_metar();
        let taf = reports.latest_taf();
        let governing = select_governing(metar, taf, departure, now);

        let flight_category = governing
            .fields
            .as_ref()
            .map_or(FlightCategory::Unknown, ObservationFields::flight_category);
        let category = BriefingCategory::from(flight_category);

        let mut issues = reports.unavailable_issues();
        match &governing.fields {
            None => issues.push("No usable METAR or TAF available".to_string()),
            Some(_) if category == BriefingCategory::Unknown => {
                issues.push("Visibility and ceiling not reported".to_string());
            }
            Some(_) => {}
        }

        let window_start = departure;
        let window_end = departure + Duration::hours(i64::from(self.config.timeline.horizon_hours));
        let pireps = reports.pirep_records();
        let notams = reports.notam_records();
        let inputs = HazardInputs {
            airport,
            governing: governing.fields.as_ref(),
            metar: metar
                .filter(|_| governing.source != PrimarySource::Metar)
                .map(|metar| &metar.fields),
            taf_periods: taf
                .map(|taf| taf.periods_overlapping(window_start, window_end).collect())
                .unwrap_or_default(),
            pireps: &pireps,
            notams: &notams,
            window_start,
            window_end,
        };

        let detector = HazardDetector::new(&self.config.hazards);
        let assessment = AirportAssessment {
            airport: airport.to_string(),
            category,
            flight_category,
            primary_source: governing.source,
            hazards: detector.detect(&inputs),
            key_factors: detector.key_factors(&inputs),
            issues,
        };
        debug!(
            airport,
            category = %assessment.category,
            source = %assessment.primary_source,
            hazards = assessment.hazards.len(),
            "Assessed airport"
        );
        assessment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 12, 19, 0, 0).unwrap()
    }

    fn route(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|code| (*code).to_string()).collect()
    }

    const TAF: &str = "TAF KJFK 121730Z 1218/1324 31010KT P6SM SCT040 \
        FM130000 18008KT 2SM BR OVC008";

    #[test]
    fn test_select_governing_prefers_taf_for_future_departure() {
        let metar = crate::parser::metar::parse("KJFK 121851Z 31012KT 10SM CLR", now()).unwrap();
        let taf = crate::parser::taf::parse(TAF, now()).unwrap();

        let later = select_governing(Some(&metar), Some(&taf), now() + Duration::hours(6), now());
        assert_eq!(later.source, PrimarySource::Taf);
        assert_eq!(
            later.fields.unwrap().flight_category(),
            FlightCategory::Ifr
        );

        let immediate = select_governing(Some(&metar), Some(&taf), now(), now());
        assert_eq!(immediate.source, PrimarySource::Metar);

        let taf_only = select_governing(None, Some(&taf), now() - Duration::days(3), now());
        assert_eq!(taf_only.source, PrimarySource::Taf);

        let nothing = select_governing(None, None, now(), now());
        assert_eq!(nothing.source, PrimarySource::None);
        assert!(nothing.fields.is_none());
    }

    #[test]
    fn test_unparseable_report_is_degraded() {
        let service = RouteBriefingService::default();
        let request = BriefingRequest::new(
            route(&["KJFK", "KBOS"]),
            vec![
                RawReport::taf("KJFK", "TAF KJFK 121730Z"),
                RawReport::metar("KJFK", "KJFK 121851Z 31012KT 10SM CLR 18/06 A3012"),
            ],
        );
        let response = service.generate_at(&request, now()).unwrap();
        let jfk = &response.airports[0];
        assert!(!jfk.tafs[0].is_available());
        assert!(jfk.metars[0].is_available());
        assert_eq!(jfk.assessment.category, BriefingCategory::Clear);
        assert!(
            jfk.assessment
                .issues
                .iter()
                .any(|issue| issue.starts_with("TAF unavailable: missing validity window"))
        );

        let bos = &response.airports[1];
        assert_eq!(bos.assessment.category, BriefingCategory::Unknown);
        assert_eq!(bos.assessment.primary_source, PrimarySource::None);
    }

    #[test]
    fn test_unknown_airport_fails_before_briefing() {
        let service = RouteBriefingService::default();
        let request = BriefingRequest::new(route(&["KJFK", "XXXX"]), Vec::new());
        assert_eq!(
            service.generate_at(&request, now()).unwrap_err(),
            SkyBriefError::airport_not_found("XXXX")
        );
    }

    #[test]
    fn test_round_trip_assesses_every_visit() {
        let service = RouteBriefingService::default();
        let request = BriefingRequest::new(
            route(&["KJFK", "KORD", "KJFK"]),
            vec![
                RawReport::metar("KJFK", "KJFK 121851Z 09005KT 1/2SM FG OVC002 14/14 A2990"),
                RawReport::metar("KORD", "KORD 121851Z 27010KT 10SM FEW250 22/08 A3001"),
            ],
        );
        let response = service.generate_at(&request, now()).unwrap();
        let categories: Vec<BriefingCategory> = response
            .airports
            .iter()
            .map(|airport| airport.assessment.category)
            .collect();
        assert_eq!(
            categories,
            [
                BriefingCategory::Severe,
                BriefingCategory::Clear,
                BriefingCategory::Severe
            ]
        );
        let arrival = &response.airports[2];
        assert_eq!(arrival.metars.len(), 1);
        assert!(arrival.assessment.issues.is_empty());
        assert_eq!(response.briefing.critical_airports, ["KJFK"]);
    }

    #[test]
    fn test_old_pireps_are_dropped_and_sorted() {
        let service = RouteBriefingService::default();
        let request = BriefingRequest::new(
            route(&["KJFK", "KBOS"]),
            vec![
                RawReport::pirep("KJFK", "UA /OV JFK/TM 1800/FL080/TB LGT"),
                RawReport::pirep("KJFK", "UA /OV JFK/TM 1845/FL060/TB MOD"),
                RawReport::pirep("KJFK", "UA /OV JFK/TM 1200/FL100/TB SEV"),
            ],
        );
        let response = service.generate_at(&request, now()).unwrap();
        let times: Vec<_> = response.airports[0]
            .pireps
            .iter()
            .filter_map(|entry| entry.record())
            .map(|pirep| pirep.altitude_ft)
            .collect();
        assert_eq!(times, [Some(6000), Some(8000)]);
    }
}
