//! Simplified English renderings of decoded reports
//!
//! Each renderer joins short phrases with ` | `, for example
//! `Station KJFK | winds from northwest at 12 knots | visibility 10 statute miles`.

use chrono::{DateTime, Utc};

use crate::models::{
    ChangeKind, ForecastPeriod, ObservationFields, ParsedObservation, PirepRecord, TafForecast,
    Visibility, WeatherPhenomenon, Wind, WindDirection,
};

const SEPARATOR: &str = " | ";

const COMPASS_POINTS: [&str; 8] = [
    "north",
    "northeast",
    "east",
    "southeast",
    "south",
    "southwest",
    "west",
    "northwest",
];

/// Nearest of the eight compass points
#[must_use]
pub fn compass_point(degrees: u16) -> &'static str {
    let index = (f64::from(degrees % 360) / 45.0).round() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

fn format_time(time: DateTime<Utc>) -> String {
    time.format("%d %b %H:%MZ").to_string()
}

#[must_use]
pub fn describe_wind(wind: &Wind) -> String {
    if wind.is_calm() {
        return "calm winds".to_string();
    }
    let mut text = match wind.direction {
        WindDirection::Degrees(degrees) => {
            format!("winds from {} at {} knots", compass_point(degrees), wind.speed_kt)
        }
        WindDirection::Variable => format!("variable winds at {} knots", wind.speed_kt),
    };
    if let Some(gust) = wind.gust_kt.filter(|gust| *gust > wind.speed_kt) {
        text.push_str(&format!(" gusting to {gust} knots"));
    }
    if let Some((from, to)) = wind.variable_range {
        text.push_str(&format!(" varying between {from} and {to} degrees"));
    }
    text
}

fn describe_visibility(visibility: Visibility) -> String {
    match visibility {
        Visibility::StatuteMiles(miles) => format!("visibility {miles} statute miles"),
        Visibility::Unlimited => "visibility unlimited".to_string(),
    }
}

/// Wind, visibility, weather and cloud phrases of a set of fields
fn condition_phrases(fields: &ObservationFields) -> Vec<String> {
    let mut phrases = Vec::new();
    if let Some(wind) = &fields.wind {
        phrases.push(describe_wind(wind));
    }
    if let Some(visibility) = fields.visibility {
        phrases.push(describe_visibility(visibility));
    }
    let weather = fields.weather_groups();
    if !weather.is_empty() {
        phrases.push(
            weather
                .iter()
                .map(WeatherPhenomenon::description)
                .collect::<Vec<_>>()
                .join(" and "),
        );
    }
    match &fields.sky_layers {
        Some(layers) if layers.is_empty() => phrases.push("no significant clouds".to_string()),
        Some(layers) => phrases.extend(layers.iter().map(|layer| layer.describe())),
        None => {}
    }
    phrases
}

/// `Station KJFK | observed 12 Jun 18:51Z | winds from northwest at 12 knots | ...`
#[must_use]
pub fn metar(observation: &ParsedObservation) -> String {
    let fields = &observation.fields;
    let mut parts = vec![
        format!("Station {}", observation.station),
        format!("observed {}", format_time(observation.reference_time)),
    ];
    parts.extend(condition_phrases(fields));
    if let (Some(temperature), Some(dewpoint)) = (fields.temperature_c, fields.dewpoint_c) {
        parts.push(format!("temperature {temperature}°C"));
        parts.push(format!("dewpoint {dewpoint}°C"));
    }
    if let Some(altimeter) = fields.altimeter_inhg {
        parts.push(format!("altimeter {altimeter:.2} inHg"));
    }
    parts.join(SEPARATOR)
}

fn period_label(period: &ForecastPeriod) -> String {
    let window = format!(
        "between {} and {}",
        format_time(period.valid_from),
        format_time(period.valid_to)
    );
    match period.change_kind {
        ChangeKind::Base => "initially".to_string(),
        ChangeKind::Fm => format!("from {}", format_time(period.valid_from)),
        ChangeKind::Becmg => format!("becoming {window}"),
        ChangeKind::Tempo => format!("temporarily {window}"),
        ChangeKind::Prob => format!(
            "{}% chance {window}",
            period.probability_pct.unwrap_or_default()
        ),
    }
}

/// `Terminal forecast for KJFK | issued ... | valid ... | initially: ... | ...`
#[must_use]
pub fn taf(forecast: &TafForecast) -> String {
    let mut header = format!("Terminal forecast for {}", forecast.station);
    if forecast.amendment {
        header.push_str(" (amended)");
    }
    let mut parts = vec![header];
    if let Some(issued) = forecast.issue_time {
        parts.push(format!("issued {}", format_time(issued)));
    }
    parts.push(format!(
        "valid {} to {}",
        format_time(forecast.valid_from),
        format_time(forecast.valid_to)
    ));

    let periods: Vec<String> = forecast
        .periods
        .iter()
        .filter_map(|period| {
            let phrases = condition_phrases(&period.fields);
            (!phrases.is_empty())
                .then(|| format!("{}: {}", period_label(period), phrases.join(", ")))
        })
        .collect();
    if periods.is_empty() {
        parts.push("detailed forecast conditions available".to_string());
    } else {
        parts.extend(periods);
    }

    let mut changes: Vec<&str> = Vec::new();
    for change in forecast.periods.iter().flat_map(|p| &p.significant_changes) {
        if !changes.contains(&change.as_str()) {
            changes.push(change);
        }
    }
    if !changes.is_empty() {
        parts.push(format!("significant changes: {}", changes.join(", ")));
    }
    parts.join(SEPARATOR)
}

/// `Location JFK090010 | reported at 18:30Z | aircraft B737 | at 8000 feet | ...`
#[must_use]
pub fn pirep(record: &PirepRecord) -> String {
    let mut parts = Vec::new();
    if record.is_urgent() {
        parts.push("URGENT pilot report".to_string());
    }
    if let Some(location) = &record.location {
        parts.push(format!("Location {location}"));
    }
    if let Some(time) = record.reported_time {
        parts.push(format!("reported at {}", time.format("%H:%MZ")));
    }
    if let Some(aircraft) = &record.aircraft_type {
        parts.push(format!("aircraft {aircraft}"));
    }
    if let Some(altitude) = record.altitude_ft {
        parts.push(format!("at {altitude} feet"));
    }
    if let Some(turbulence) = &record.turbulence {
        let kind = turbulence
            .kind
            .map_or_else(String::new, |kind| format!(" ({kind})"));
        parts.push(format!("turbulence: {}{kind}", turbulence.intensity));
    }
    if let Some(icing) = &record.icing {
        let kind = icing.kind.map_or_else(String::new, |kind| format!(" {kind}"));
        parts.push(format!("icing: {}{kind}", icing.intensity));
    }
    if record.wind_shear {
        parts.push("wind shear reported".to_string());
    }
    if let Some(sky) = &record.sky {
        parts.push(format!("sky: {sky}"));
    }
    if let Some(weather) = &record.weather {
        parts.push(format!("weather: {weather}"));
    }
    if let Some(remarks) = &record.remarks {
        parts.push(format!("remarks: {remarks}"));
    }

    if parts.is_empty() {
        "No pilot report information available".to_string()
    } else {
        parts.join(SEPARATOR)
    }
}
