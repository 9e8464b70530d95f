//! Data models for the `SkyBrief` briefing engine
//!
//! This module contains the core domain models organized by concern:
//! - Report: raw report input and the parsed report union
//! - Observation: METAR fields shared with resolved TAF periods
//! - Forecast: TAF periods and overlay resolution
//! - Pirep / Notam: pilot reports and notices to airmen
//! - Airport: coordinates used for distances
//! - Assessment / Briefing: per-airport and route-level results

pub mod airport;
pub mod assessment;
pub mod briefing;
pub mod forecast;
pub mod notam;
pub mod observation;
pub mod pirep;
pub mod report;

// Re-export all public types for convenient access
pub use airport::{Airport, GeoPoint};
pub use assessment::{
    AirportAssessment, BriefingCategory, Hazard, HazardKind, HazardLevel, PrimarySource,
};
pub use briefing::{
    AirportReport, BriefingRequest, BriefingResponse, ReportEntry, RiskLevel, RouteBriefing,
    RouteLeg, RouteMetadata, TimelinePoint, WeatherIcon,
};
pub use forecast::{ChangeKind, ForecastPeriod, ResolvedConditions, TafForecast};
pub use notam::{NotamCategory, NotamRecord, NotamSeverity};
pub use observation::{
    Ceiling, ConvectiveCloud, Descriptor, Intensity, ObservationFields, ParsedObservation,
    PhenomenonCode, SkyCoverage, SkyLayer, Visibility, WeatherPhenomenon, Wind, WindDirection,
};
pub use pirep::{
    IcingReport, IcingType, PirepIntensity, PirepKind, PirepRecord, TurbulenceReport,
    TurbulenceType,
};
pub use report::{ParsedReport, RawReport, ReportType};
