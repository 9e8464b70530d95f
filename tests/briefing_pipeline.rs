//! Integration tests for the route briefing pipeline

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use skybrief::{
    BriefingCategory, BriefingRequest, FlightPlan, RawReport, RiskLevel, RouteBriefingService,
    SkyBriefError,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 12, 19, 0, 0).unwrap()
}

fn route(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|code| (*code).to_string()).collect()
}

fn cross_country_reports() -> Vec<RawReport> {
    vec![
        RawReport::metar("KJFK", "KJFK 121851Z 31012KT 10SM FEW250 18/06 A3012"),
        RawReport::taf(
            "KJFK",
            "TAF KJFK 121730Z 1218/1324 31010KT P6SM SCT040 TEMPO 1220/1224 3SM TSRA BKN020CB",
        ),
        RawReport::metar("KORD", "KORD 121851Z 27015G28KT 4SM -RA BKN025 OVC040 16/12 A2992"),
        RawReport::pirep("KORD", "ORD UA /OV ORD/TM 1830/FL080/TP B737/TB MOD CHOP"),
        RawReport::metar("KLAX", "KLAX 121853Z 25006KT 1/2SM FG OVC002 14/14 A2990"),
        RawReport::taf("KLAX", "TAF KLAX 121720Z"),
        RawReport::notam(
            "KLAX",
            "A1234/25 NOTAMN A) KLAX B) 2506120000 C) 2506132359 E) RWY 07L/25R CLSD",
        ),
        RawReport::metar("KDEN", "KDEN 121853Z 36010KT 10SM CLR 24/02 A3001"),
    ]
}

/// A mixed route produces a severe briefing with per-airport detail
#[test]
fn test_cross_country_briefing() {
    let service = RouteBriefingService::default();
    let request = BriefingRequest::new(route(&["KJFK", "KORD", "KLAX"]), cross_country_reports());
    let response = service.generate_at(&request, now()).unwrap();

    assert_eq!(response.briefing.overall_category, BriefingCategory::Severe);
    assert_eq!(response.briefing.risk_level, RiskLevel::High);
    assert_eq!(response.briefing.critical_airports, ["KORD", "KLAX"]);
    assert!(!response.briefing.insufficient_data);
    assert!(response.briefing.executive_summary.starts_with("CAUTION"));
    assert!(!response.briefing.pilot_recommendations.is_empty());

    let categories: Vec<BriefingCategory> = response
        .airports
        .iter()
        .map(|airport| airport.assessment.category)
        .collect();
    assert_eq!(
        categories,
        [
            BriefingCategory::Clear,
            BriefingCategory::Significant,
            BriefingCategory::Severe
        ]
    );

    // Off-route KDEN report is ignored
    assert!(response.airports.iter().all(|airport| airport.airport != "KDEN"));

    let lax = &response.airports[2];
    assert!(!lax.tafs[0].is_available());
    assert!(lax.metars[0].is_available());
    assert_eq!(lax.notams.len(), 1);
    assert!(
        lax.assessment
            .issues
            .iter()
            .any(|issue| issue.starts_with("TAF unavailable"))
    );
}

/// The serialized response carries the tags chart and UI consumers rely on
#[test]
fn test_response_json_shape() {
    let service = RouteBriefingService::default();
    let request = BriefingRequest::new(route(&["KJFK", "KORD", "KLAX"]), cross_country_reports());
    let response = service.generate_at(&request, now()).unwrap();
    let json: Value = serde_json::to_value(&response).unwrap();

    assert_eq!(json["briefing"]["overall_category"], "SEVERE");
    assert_eq!(json["briefing"]["risk_level"], "HIGH");
    assert_eq!(json["airports"][0]["assessment"]["primary_source"], "METAR");
    assert_eq!(json["airports"][2]["assessment"]["flight_category"], "LIFR");
    assert_eq!(json["airports"][2]["tafs"][0]["status"], "unavailable");
    assert_eq!(json["airports"][0]["metars"][0]["status"], "parsed");

    let plain = json["airports"][0]["metars"][0]["plain_language"].as_str().unwrap();
    assert!(plain.starts_with("Station KJFK | observed 12 Jun 18:51Z"));

    assert_eq!(json["metadata"]["departure_airport"], "KJFK");
    assert_eq!(json["metadata"]["arrival_airport"], "KLAX");
    assert_eq!(json["metadata"]["waypoints_count"], 1);
    assert_eq!(json["metadata"]["legs"].as_array().unwrap().len(), 2);
}

/// Route distance totals the legs and the timeline follows the aircraft
#[test]
fn test_metadata_and_timeline() {
    let service = RouteBriefingService::default();
    let request = BriefingRequest::new(route(&["KJFK", "KORD", "KLAX"]), cross_country_reports());
    let response = service.generate_at(&request, now()).unwrap();

    let metadata = &response.metadata;
    let legs_total: f64 = metadata.legs.iter().map(|leg| leg.distance_nm).sum();
    assert!((metadata.total_distance_nm - legs_total).abs() < 1e-9);
    assert!(metadata.total_distance_nm > 2000.0 && metadata.total_distance_nm < 2300.0);

    let timeline = &response.timeline;
    assert_eq!(timeline.len(), 24);
    assert_eq!(timeline[0].time, now());
    assert_eq!(timeline[0].location, "KJFK");
    assert_eq!(timeline[timeline.len() - 1].location, "KLAX");
    assert!(timeline.windows(2).all(|pair| pair[0].time < pair[1].time));
}

/// Same inputs and analysis time give the same briefing
#[test]
fn test_briefing_is_reproducible() {
    let service = RouteBriefingService::default();
    let request = BriefingRequest::new(route(&["KJFK", "KORD", "KLAX"]), cross_country_reports());
    let first = serde_json::to_string(&service.generate_at(&request, now()).unwrap()).unwrap();
    let second = serde_json::to_string(&service.generate_at(&request, now()).unwrap()).unwrap();
    assert_eq!(first, second);
}

/// A later departure is classified from the TAF
#[test]
fn test_future_departure_uses_forecast() {
    let service = RouteBriefingService::default();
    let request = BriefingRequest::new(
        route(&["KJFK", "KBOS"]),
        vec![
            RawReport::metar("KJFK", "KJFK 121851Z 31012KT 10SM CLR 18/06 A3012"),
            RawReport::taf(
                "KJFK",
                "TAF KJFK 121730Z 1218/1324 31010KT P6SM SCT040 FM130000 18008KT 2SM BR OVC008",
            ),
        ],
    )
    .with_departure_time(now() + Duration::hours(7));
    let response = service.generate_at(&request, now()).unwrap();

    let json: Value = serde_json::to_value(&response.airports[0].assessment).unwrap();
    assert_eq!(json["primary_source"], "TAF");
    assert_eq!(json["flight_category"], "IFR");
    assert_eq!(response.departure_time, now() + Duration::hours(7));
}

/// No reports at all yields an UNKNOWN briefing rather than an error
#[test]
fn test_route_without_reports() {
    let service = RouteBriefingService::default();
    let request = BriefingRequest::new(route(&["KJFK", "KBOS"]), Vec::new());
    let response = service.generate_at(&request, now()).unwrap();

    assert_eq!(response.briefing.overall_category, BriefingCategory::Unknown);
    assert_eq!(response.briefing.risk_level, RiskLevel::Moderate);
    assert!(response.briefing.insufficient_data);
    assert!(response.briefing.executive_summary.starts_with("UNKNOWN"));
    assert!(response.timeline.is_empty());
}

/// Unknown airports and malformed routes fail before any briefing is built
#[test]
fn test_request_errors() {
    let service = RouteBriefingService::default();

    let unknown = BriefingRequest::new(route(&["KJFK", "ZZZZ"]), cross_country_reports());
    let err = service.generate_at(&unknown, now()).unwrap_err();
    assert!(matches!(err, SkyBriefError::AirportNotFound { ref code } if code == "ZZZZ"));
    assert!(err.user_message().contains("ZZZZ"));

    let single = BriefingRequest::new(route(&["KJFK"]), Vec::new());
    assert!(matches!(
        service.generate_at(&single, now()).unwrap_err(),
        SkyBriefError::Validation { .. }
    ));
}

/// Free-text flight plans feed straight into the pipeline
#[test]
fn test_flight_plan_request() {
    let plan = FlightPlan::parse("FLIGHT PLAN KJFK..KORD..KLAX FL350 ACFT B738").unwrap();
    let request = plan.into_request(cross_country_reports());
    let response = RouteBriefingService::default()
        .generate_at(&request, now())
        .unwrap();

    assert_eq!(response.metadata.cruise_altitude_ft, Some(35000));
    assert_eq!(response.metadata.aircraft_type.as_deref(), Some("B738"));
    assert_eq!(response.airports.len(), 3);
}
