//! `SkyBrief` - Aviation weather interpretation and route briefing
//!
//! This library decodes METAR, TAF, PIREP and NOTAM text for the airports of a
//! route, classifies each airport, detects hazards, and synthesizes a route-level
//! briefing with a forecast timeline suitable for charting.

pub mod briefing;
pub mod config;
pub mod distance;
pub mod error;
pub mod flight_category;
pub mod hazards;
pub mod models;
pub mod parser;
pub mod plain_language;
pub mod route;
pub mod route_briefing;
pub mod telemetry;
pub mod timeline;

// Re-export core types for public API
pub use briefing::{BriefingSynthesizer, RouteContext};
pub use config::{BriefingLimits, HazardThresholds, LoggingConfig, SkyBriefConfig, TimelineConfig};
pub use distance::AirportDirectory;
pub use error::SkyBriefError;
pub use flight_category::{FlightCategory, classify};
pub use hazards::{HazardDetector, HazardInputs};
pub use models::{
    AirportAssessment, BriefingCategory, BriefingRequest, BriefingResponse, Hazard, HazardKind,
    ParsedReport, RawReport, ReportType, RiskLevel, RouteBriefing, TimelinePoint,
};
pub use parser::ReportParser;
pub use route::FlightPlan;
pub use route_briefing::RouteBriefingService;
pub use timeline::{AirportTimelineInput, TimelineBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, SkyBriefError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
