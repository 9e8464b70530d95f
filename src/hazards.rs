//! Hazard detection and key-factor analysis for one airport
//!
//! Observed conditions, forecast periods, pilot reports and NOTAMs are checked
//! against the configured thresholds. Results are de-duplicated by description
//! and ordered by [`HazardKind`], most severe first.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

use crate::config::HazardThresholds;
use crate::models::{
    ChangeKind, ConvectiveCloud, ForecastPeriod, Hazard, HazardKind, HazardLevel, NotamRecord,
    NotamSeverity, ObservationFields, PirepIntensity, PirepRecord, WeatherPhenomenon, Wind,
};

/// Everything known about one airport for the analysis window
#[derive(Debug, Clone)]
pub struct HazardInputs<'a> {
    pub airport: &'a str,
    /// Conditions the airport is classified from
    pub governing: Option<&'a ObservationFields>,
    /// Latest METAR fields, when different from the governing observation
    pub metar: Option<&'a ObservationFields>,
    /// TAF periods overlapping the analysis window
    pub taf_periods: Vec<&'a ForecastPeriod>,
    pub pireps: &'a [PirepRecord],
    pub notams: &'a [NotamRecord],
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

/// Detects hazards and grades conditions against [`HazardThresholds`]
#[derive(Debug, Clone)]
pub struct HazardDetector {
    thresholds: HazardThresholds,
}

fn format_wind(wind: &Wind) -> String {
    match wind.gust_kt {
        Some(gust) => format!("{} kt gusting {gust} kt", wind.speed_kt),
        None => format!("{} kt", wind.speed_kt),
    }
}

fn period_label(period: &ForecastPeriod) -> String {
    let window = format!(
        "{}-{}Z",
        period.valid_from.format("%d/%H%M"),
        period.valid_to.format("%d/%H%M")
    );
    match period.probability_pct {
        Some(pct) => format!("PROB{pct} {window}"),
        None => format!("{} {window}", period.change_kind),
    }
}

impl HazardDetector {
    #[must_use]
    pub fn new(thresholds: &HazardThresholds) -> Self {
        Self {
            thresholds: thresholds.clone(),
        }
    }

    /// Hazards for one airport, de-duplicated and most severe first
    #[must_use]
    pub fn detect(&self, inputs: &HazardInputs<'_>) -> Vec<Hazard> {
        let mut hazards = Vec::new();

        if let Some(governing) = inputs.governing {
            self.observation_hazards(governing, "", &mut hazards);
        }
        if let Some(metar) = inputs.metar {
            self.observation_hazards(metar, "", &mut hazards);
        }
        for period in &inputs.taf_periods {
            let suffix = format!(" forecast ({})", period_label(period));
            self.observation_hazards(&period.fields, &suffix, &mut hazards);
        }
        for pirep in inputs
            .pireps
            .iter()
            .filter(|pirep| pirep.is_recent(self.thresholds.pirep_max_age_hours))
        {
            self.pirep_hazards(pirep, &mut hazards);
        }
        for notam in inputs.notams.iter().filter(|notam| {
            notam.is_active_during(inputs.window_start, inputs.window_end)
        }) {
            Self::notam_hazards(notam, &mut hazards);
        }

        let mut seen = HashSet::new();
        hazards.retain(|hazard: &Hazard| seen.insert(hazard.description.clone()));
        hazards.sort_by_key(|hazard| hazard.kind);

        debug!(airport = inputs.airport, count = hazards.len(), "Detected hazards");
        hazards
    }

    fn observation_hazards(&self, fields: &ObservationFields, suffix: &str, out: &mut Vec<Hazard>) {
        let thresholds = &self.thresholds;

        for phenomenon in fields.weather_groups() {
            if phenomenon.is_thunderstorm() {
                out.push(Hazard::new(
                    HazardKind::Thunderstorm,
                    HazardLevel::High,
                    format!("Thunderstorm: {}{suffix}", phenomenon.description()),
                ));
            }
        }
        for layer in fields.layers() {
            if layer.convective == Some(ConvectiveCloud::Cb) {
                let height = layer
                    .height_ft
                    .map_or_else(String::new, |height| format!(" at {height} ft"));
                out.push(Hazard::new(
                    HazardKind::Thunderstorm,
                    HazardLevel::High,
                    format!("Cumulonimbus clouds{height}{suffix}"),
                ));
            }
        }

        for phenomenon in fields.weather_groups() {
            if phenomenon.is_freezing() {
                let level = if phenomenon.is_precipitation() {
                    HazardLevel::High
                } else {
                    HazardLevel::Moderate
                };
                out.push(Hazard::new(
                    HazardKind::Icing,
                    level,
                    format!("Icing conditions: {}{suffix}", phenomenon.description()),
                ));
            }
        }

        if let Some(wind) = &fields.wind {
            let peak = wind.peak_kt();
            if peak >= thresholds.wind_severe_kt {
                out.push(Hazard::new(
                    HazardKind::StrongWind,
                    HazardLevel::High,
                    format!("Severe winds {}{suffix}", format_wind(wind)),
                ));
            } else if peak >= thresholds.wind_strong_kt {
                out.push(Hazard::new(
                    HazardKind::StrongWind,
                    HazardLevel::Moderate,
                    format!("Strong winds {}{suffix}", format_wind(wind)),
                ));
            }
        }

        if let Some(visibility) = fields.visibility {
            if visibility.is_below(thresholds.lifr_visibility_sm) {
                out.push(Hazard::new(
                    HazardKind::LowVisibility,
                    HazardLevel::High,
                    format!("Low visibility {visibility}{suffix}"),
                ));
            }
        }
        for phenomenon in fields.weather_groups() {
            if phenomenon.is_fog() {
                out.push(Hazard::new(
                    HazardKind::LowVisibility,
                    HazardLevel::Moderate,
                    format!("Fog: {}{suffix}", phenomenon.description()),
                ));
            }
        }

        if let Some(ceiling) = fields.ceiling {
            if ceiling.is_below(thresholds.lifr_ceiling_ft) {
                out.push(Hazard::new(
                    HazardKind::LowCeiling,
                    HazardLevel::High,
                    format!("Low ceiling {ceiling}{suffix}"),
                ));
            }
        }

        for phenomenon in fields.weather_groups() {
            if phenomenon.is_heavy_precipitation() {
                out.push(Hazard::new(
                    HazardKind::HeavyPrecipitation,
                    HazardLevel::Moderate,
                    format!("Heavy precipitation: {}{suffix}", phenomenon.description()),
                ));
            }
        }
    }

    fn pirep_hazards(&self, pirep: &PirepRecord, out: &mut Vec<Hazard>) {
        let minimum = self.thresholds.pirep_min_intensity;
        let level_for = |intensity: PirepIntensity| {
            if intensity >= PirepIntensity::Sev {
                HazardLevel::High
            } else {
                HazardLevel::Moderate
            }
        };
        let altitude = pirep
            .altitude_ft
            .map_or_else(String::new, |feet| format!(" at {feet} ft"));

        if let Some(icing) = pirep.icing.as_ref().filter(|ic| ic.intensity.score() >= minimum) {
            let kind = icing
                .kind
                .map_or_else(String::new, |kind| format!(" {kind}"));
            out.push(Hazard::new(
                HazardKind::Icing,
                level_for(icing.intensity),
                format!("PIREP: {}{kind} icing{altitude}", icing.intensity),
            ));
        }
        if let Some(turbulence) = pirep
            .turbulence
            .as_ref()
            .filter(|tb| tb.intensity.score() >= minimum)
        {
            let kind = turbulence
                .kind
                .map_or_else(String::new, |kind| format!(" ({kind})"));
            out.push(Hazard::new(
                HazardKind::Turbulence,
                level_for(turbulence.intensity),
                format!("PIREP: {} turbulence{kind}{altitude}", turbulence.intensity),
            ));
        }
        if pirep.wind_shear {
            out.push(Hazard::new(
                HazardKind::WindShear,
                HazardLevel::High,
                format!("PIREP: low-level wind shear{altitude}"),
            ));
        }
    }

    fn notam_hazards(notam: &NotamRecord, out: &mut Vec<Hazard>) {
        if notam.severity == NotamSeverity::High && notam.category.is_operational() {
            out.push(Hazard::new(
                HazardKind::NotamRestriction,
                HazardLevel::Moderate,
                format!("NOTAM {}: {}", notam.id, notam.summary),
            ));
        }
    }

    /// Graded condition wording such as "Visibility: 3 SM (Marginal)"
    #[must_use]
    pub fn key_factors(&self, inputs: &HazardInputs<'_>) -> Vec<String> {
        let mut factors = Vec::new();

        if let Some(fields) = inputs.governing {
            if let Some(visibility) = fields.visibility {
                let grade = match visibility.statute_miles() {
                    None => "Good",
                    Some(miles) if miles > 5.0 => "Good",
                    Some(miles) if miles >= 3.0 => "Marginal",
                    Some(_) => "Poor",
                };
                factors.push(format!("Visibility: {visibility} ({grade})"));
            }
            if let Some(ceiling) = fields.ceiling {
                let grade = match ceiling.feet() {
                    None => "Good",
                    Some(feet) if feet > 3000 => "Good",
                    Some(feet) if feet >= 1000 => "Marginal",
                    Some(_) => "Low",
                };
                factors.push(format!("Ceiling: {ceiling} ({grade})"));
            }
            if let Some(wind) = &fields.wind {
                factors.push(format!("Winds: {} ({})", format_wind(wind), self.wind_grade(wind)));
            }
        }

        let periods = &inputs.taf_periods;
        let taf_factors = [
            (
                "Thunderstorms forecast",
                periods.iter().any(|p| p.fields.has_thunderstorm()),
            ),
            (
                "Fog/mist forecast",
                periods.iter().any(|p| {
                    p.fields
                        .weather_groups()
                        .iter()
                        .any(|w| w.is_fog() || w.is_mist())
                }),
            ),
            (
                "Precipitation forecast",
                periods.iter().any(|p| {
                    p.fields
                        .weather_groups()
                        .iter()
                        .any(WeatherPhenomenon::is_precipitation)
                }),
            ),
            (
                "Temporary conditions expected",
                periods.iter().any(|p| p.change_kind == ChangeKind::Tempo),
            ),
            (
                "Probability conditions forecast",
                periods.iter().any(|p| p.probability_pct.is_some()),
            ),
            (
                "Conditions becoming different",
                periods.iter().any(|p| p.change_kind == ChangeKind::Becmg),
            ),
            (
                "Strong wind gusts forecast",
                periods.iter().any(|p| {
                    p.fields
                        .wind
                        .as_ref()
                        .and_then(|w| w.gust_kt)
                        .is_some_and(|gust| gust >= self.thresholds.wind_strong_kt)
                }),
            ),
        ];
        factors.extend(
            taf_factors
                .into_iter()
                .filter(|(_, present)| *present)
                .map(|(label, _)| label.to_string()),
        );

        let recent: Vec<&PirepRecord> = inputs
            .pireps
            .iter()
            .filter(|pirep| pirep.is_recent(self.thresholds.pirep_max_age_hours))
            .collect();
        if recent
            .iter()
            .any(|p| p.turbulence.as_ref().is_some_and(|tb| tb.intensity > PirepIntensity::Neg))
        {
            factors.push("Turbulence reported by pilots".to_string());
        }
        if recent
            .iter()
            .any(|p| p.icing.as_ref().is_some_and(|ic| ic.intensity > PirepIntensity::Neg))
        {
            factors.push("Icing conditions reported".to_string());
        }
        if recent.iter().any(|p| {
            p.turbulence
                .as_ref()
                .is_some_and(|tb| tb.intensity == PirepIntensity::Neg)
        }) {
            factors.push("Smooth conditions reported".to_string());
        }

        factors
    }

    fn wind_grade(&self, wind: &Wind) -> &'static str {
        let peak = wind.peak_kt();
        if peak < self.thresholds.wind_moderate_kt {
            "Light"
        } else if peak < self.thresholds.wind_strong_kt {
            "Moderate"
        } else if peak < self.thresholds.wind_severe_kt {
            "Strong"
        } else {
            "Severe"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Ceiling, Descriptor, Intensity, NotamCategory, PhenomenonCode, PirepKind, SkyCoverage,
        SkyLayer, TurbulenceReport, TurbulenceType, Visibility, WindDirection,
    };
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 12, 18, 0, 0).unwrap()
    }

    fn inputs<'a>(
        governing: Option<&'a ObservationFields>,
        pireps: &'a [PirepRecord],
        notams: &'a [NotamRecord],
    ) -> HazardInputs<'a> {
        HazardInputs {
            airport: "KJFK",
            governing,
            metar: None,
            taf_periods: Vec::new(),
            pireps,
            notams,
            window_start: now(),
            window_end: now() + Duration::hours(1),
        }
    }

    fn wind(speed_kt: u32, gust_kt: Option<u32>) -> Wind {
        Wind {
            direction: WindDirection::Degrees(270),
            speed_kt,
            gust_kt,
            variable_range: None,
        }
    }

    fn pirep(intensity: PirepIntensity, age_hours: f64) -> PirepRecord {
        PirepRecord {
            kind: PirepKind::Ua,
            location: Some("JFK".to_string()),
            reported_time: None,
            aircraft_type: None,
            altitude_ft: Some(8000),
            turbulence: Some(TurbulenceReport {
                intensity,
                kind: Some(TurbulenceType::Chop),
                raw: String::new(),
            }),
            icing: None,
            sky: None,
            weather: None,
            wind_shear: false,
            remarks: None,
            age_hours: Some(age_hours),
            severity_score: intensity.score(),
        }
    }

    #[rstest]
    #[case(14, None, None)]
    #[case(25, None, Some(HazardLevel::Moderate))]
    #[case(20, Some(30), Some(HazardLevel::Moderate))]
    #[case(35, None, Some(HazardLevel::High))]
    #[case(28, Some(40), Some(HazardLevel::High))]
    fn test_wind_thresholds(
        #[case] speed: u32,
        #[case] gust: Option<u32>,
        #[case] expected: Option<HazardLevel>,
    ) {
        let detector = HazardDetector::new(&HazardThresholds::default());
        let fields = ObservationFields {
            wind: Some(wind(speed, gust)),
            ..ObservationFields::default()
        };
        let hazards = detector.detect(&inputs(Some(&fields), &[], &[]));
        let level = hazards
            .iter()
            .find(|h| h.kind == HazardKind::StrongWind)
            .map(|h| h.level);
        assert_eq!(level, expected);
    }

    #[test]
    fn test_ordering_and_dedup() {
        let detector = HazardDetector::new(&HazardThresholds::default());
        let fields = ObservationFields {
            wind: Some(wind(30, None)),
            visibility: Some(Visibility::StatuteMiles(0.5)),
            ceiling: Some(Ceiling::Feet(200)),
            sky_layers: Some(vec![SkyLayer {
                coverage: SkyCoverage::Ovc,
                height_ft: Some(200),
                convective: Some(ConvectiveCloud::Cb),
            }]),
            weather: Some(vec![WeatherPhenomenon {
                raw: "+TSRA".to_string(),
                intensity: Intensity::Heavy,
                descriptor: Some(Descriptor::Ts),
                codes: vec![PhenomenonCode::Ra],
            }]),
            ..ObservationFields::default()
        };
        let mut inputs = inputs(Some(&fields), &[], &[]);
        // same fields again as the METAR must not duplicate anything
        inputs.metar = Some(&fields);
        let hazards = detector.detect(&inputs);

        let kinds: Vec<HazardKind> = hazards.iter().map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![
                HazardKind::Thunderstorm,
                HazardKind::Thunderstorm,
                HazardKind::StrongWind,
                HazardKind::LowVisibility,
                HazardKind::LowCeiling,
                HazardKind::HeavyPrecipitation,
            ]
        );
        assert!(hazards[0].description.starts_with("Thunderstorm"));
        assert!(hazards[1].description.starts_with("Cumulonimbus"));
    }

    #[test]
    fn test_pirep_intensity_and_age() {
        let detector = HazardDetector::new(&HazardThresholds::default());
        let pireps = vec![
            pirep(PirepIntensity::Lgt, 0.5),
            pirep(PirepIntensity::Sev, 5.0),
            pirep(PirepIntensity::Mod, 1.0),
        ];
        let hazards = detector.detect(&inputs(None, &pireps, &[]));
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].kind, HazardKind::Turbulence);
        assert_eq!(hazards[0].level, HazardLevel::Moderate);
        assert!(hazards[0].description.contains("moderate turbulence (CHOP) at 8000 ft"));
    }

    #[test]
    fn test_notam_restriction_requires_active_high_operational() {
        let detector = HazardDetector::new(&HazardThresholds::default());
        let notam = |category, severity, start_offset_hours: i64| NotamRecord {
            id: "A0001/25".to_string(),
            category,
            severity,
            start_time: Some(now() + Duration::hours(start_offset_hours)),
            end_time: None,
            summary: "Runway 04L/22R is closed".to_string(),
            affects_operations: true,
            raw_text: String::new(),
        };
        let notams = vec![
            notam(NotamCategory::Runway, NotamSeverity::High, 0),
            notam(NotamCategory::Airspace, NotamSeverity::High, 0),
            notam(NotamCategory::Lighting, NotamSeverity::Medium, 0),
        ];
        let hazards = detector.detect(&inputs(None, &[], &notams));
        assert_eq!(hazards.len(), 1);
        assert_eq!(hazards[0].kind, HazardKind::NotamRestriction);
        assert_eq!(hazards[0].level, HazardLevel::Moderate);

        let later = vec![notam(NotamCategory::Runway, NotamSeverity::High, 6)];
        assert!(detector.detect(&inputs(None, &[], &later)).is_empty());
    }

    #[test]
    fn test_forecast_hazards_are_labelled() {
        let detector = HazardDetector::new(&HazardThresholds::default());
        let period = ForecastPeriod {
            valid_from: now(),
            valid_to: now() + Duration::hours(4),
            change_kind: ChangeKind::Tempo,
            probability_pct: None,
            fields: ObservationFields {
                weather: Some(vec![WeatherPhenomenon {
                    raw: "TSRA".to_string(),
                    intensity: Intensity::Moderate,
                    descriptor: Some(Descriptor::Ts),
                    codes: vec![PhenomenonCode::Ra],
                }]),
                ..ObservationFields::default()
            },
            significant_changes: Vec::new(),
        };
        let mut inputs = inputs(None, &[], &[]);
        inputs.taf_periods = vec![&period];
        let hazards = detector.detect(&inputs);
        assert_eq!(hazards.len(), 1);
        assert_eq!(
            hazards[0].description,
            "Thunderstorm: thunderstorm rain forecast (TEMPO 12/1800-12/2200Z)"
        );

        let factors = detector.key_factors(&inputs);
        assert!(factors.contains(&"Thunderstorms forecast".to_string()));
        assert!(factors.contains(&"Temporary conditions expected".to_string()));
        assert!(factors.contains(&"Precipitation forecast".to_string()));
    }

    #[test]
    fn test_key_factor_grading() {
        let detector = HazardDetector::new(&HazardThresholds::default());
        let fields = ObservationFields {
            wind: Some(wind(8, None)),
            visibility: Some(Visibility::StatuteMiles(4.0)),
            ceiling: Some(Ceiling::Feet(800)),
            ..ObservationFields::default()
        };
        let pireps = vec![pirep(PirepIntensity::Neg, 0.2)];
        let factors = detector.key_factors(&inputs(Some(&fields), &pireps, &[]));
        assert_eq!(
            factors,
            vec![
                "Visibility: 4 SM (Marginal)".to_string(),
                "Ceiling: 800 ft (Low)".to_string(),
                "Winds: 8 kt (Light)".to_string(),
                "Smooth conditions reported".to_string(),
            ]
        );
    }
}
