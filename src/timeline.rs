//! Forecast timeline for charting
//!
//! Samples the route at a fixed interval from the departure time. Each instant is
//! governed by the route airport nearest to the aircraft's position at cruise
//! speed, and its conditions come from that airport's TAF (or METAR as a last
//! resort). Attributes the reports do not pin down get a small variation drawn
//! from a generator seeded by the airport and the sample time, so the same input
//! always produces the same series.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tracing::debug;

use crate::config::TimelineConfig;
use crate::flight_category::FlightCategory;
use crate::models::{
    ChangeKind, ObservationFields, TafForecast, TimelinePoint, Visibility, WeatherIcon,
    WeatherPhenomenon,
};

const DEFAULT_TEMPERATURE_C: f64 = 15.0;
const TEMPERATURE_SPREAD_C: f64 = 1.5;
const WIND_SPREAD_KT: f64 = 3.0;

/// Reports of one route airport as seen by the timeline
#[derive(Debug, Clone, Copy)]
pub struct AirportTimelineInput<'a> {
    pub airport: &'a str,
    pub taf: Option<&'a TafForecast>,
    pub metar: Option<&'a ObservationFields>,
    /// Cumulative route distance from the departure airport
    pub route_distance_nm: f64,
}

#[derive(Debug, Clone)]
pub struct TimelineBuilder {
    config: TimelineConfig,
}

/// FNV-1a over the airport code and the sample timestamp
fn sample_seed(airport: &str, time: DateTime<Utc>) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;
    airport
        .bytes()
        .chain(time.timestamp().to_le_bytes())
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(PRIME))
}

/// Visibility band of a flight category, in statute miles
fn visibility_band(category: FlightCategory) -> (f64, f64) {
    match category {
        FlightCategory::Vfr | FlightCategory::Unknown => (6.0, 10.0),
        FlightCategory::Mvfr => (3.0, 5.0),
        FlightCategory::Ifr => (1.0, 3.0),
        FlightCategory::Lifr => (0.25, 1.0),
    }
}

fn weather_icon(fields: &ObservationFields) -> WeatherIcon {
    let weather = fields.weather_groups();
    if fields.has_thunderstorm() {
        WeatherIcon::Thunderstorm
    } else if weather.iter().any(WeatherPhenomenon::is_precipitation) {
        WeatherIcon::Precipitation
    } else if weather.iter().any(|w| w.is_fog() || w.is_mist()) {
        WeatherIcon::Fog
    } else if fields.layers().iter().any(|layer| layer.coverage.is_ceiling()) {
        WeatherIcon::Overcast
    } else {
        WeatherIcon::Clear
    }
}

fn weather_description(fields: &ObservationFields) -> String {
    let weather = fields.weather_groups();
    if weather.is_empty() {
        return "no significant weather".to_string();
    }
    weather
        .iter()
        .map(WeatherPhenomenon::description)
        .collect::<Vec<_>>()
        .join(", ")
}

fn cloud_description(fields: &ObservationFields) -> String {
    match &fields.sky_layers {
        None => "no cloud information".to_string(),
        Some(layers) if layers.is_empty() => "clear skies".to_string(),
        Some(layers) => layers
            .iter()
            .map(|layer| layer.describe())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

impl TimelineBuilder {
    #[must_use]
    pub fn new(config: &TimelineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn sample_times(&self, departure: DateTime<Utc>) -> impl Iterator<Item = DateTime<Utc>> {
        let interval = self.config.interval_minutes.max(1);
        let steps = self.config.horizon_hours * 60 / interval;
        (0..steps).map(move |step| departure + Duration::minutes(i64::from(step * interval)))
    }

    /// Route airport reached at `time` when cruising from `departure`
    fn governing_airport<'i, 'a>(
        &self,
        departure: DateTime<Utc>,
        time: DateTime<Utc>,
        inputs: &'i [AirportTimelineInput<'a>],
    ) -> Option<&'i AirportTimelineInput<'a>> {
        let elapsed_hours = (time - departure).num_seconds() as f64 / 3600.0;
        let position_nm = elapsed_hours * self.config.cruise_speed_kt;
        inputs.iter().min_by(|a, b| {
            let da = (a.route_distance_nm - position_nm).abs();
            let db = (b.route_distance_nm - position_nm).abs();
            da.total_cmp(&db)
        })
    }

    /// Time-ordered series along the route; instants without any data are omitted
    #[must_use]
    pub fn build(
        &self,
        departure: DateTime<Utc>,
        inputs: &[AirportTimelineInput<'_>],
    ) -> Vec<TimelinePoint> {
        let points: Vec<TimelinePoint> = self
            .sample_times(departure)
            .filter_map(|time| {
                let input = self.governing_airport(departure, time, inputs)?;
                Self::sample(input, time)
            })
            .collect();
        debug!(points = points.len(), airports = inputs.len(), "Built forecast timeline");
        points
    }

    /// Series for a single airport over the whole horizon
    #[must_use]
    pub fn build_airport_series(
        &self,
        departure: DateTime<Utc>,
        input: &AirportTimelineInput<'_>,
    ) -> Vec<TimelinePoint> {
        self.sample_times(departure)
            .filter_map(|time| Self::sample(input, time))
            .collect()
    }

    fn sample(input: &AirportTimelineInput<'_>, time: DateTime<Utc>) -> Option<TimelinePoint> {
        let (fields, change_kind): (ObservationFields, Option<ChangeKind>) =
            match input.taf.and_then(|taf| {
                taf.conditions_at(time)
                    .or_else(|| taf.conditions_nearest(time))
            }) {
                Some(resolved) => (resolved.fields, Some(resolved.change_kind)),
                None => (input.metar?.clone(), None),
            };

        let mut rng = StdRng::seed_from_u64(sample_seed(input.airport, time));
        let metar = input.metar;
        let flight_category = fields.flight_category();

        let visibility_sm = match fields.visibility {
            Some(Visibility::StatuteMiles(miles)) => miles,
            // unlimited is VFR on its own, whatever the ceiling says
            Some(Visibility::Unlimited) => {
                let (low, high) = visibility_band(FlightCategory::Vfr);
                rng.random_range(low..high)
            }
            None => {
                let (low, high) = visibility_band(flight_category);
                rng.random_range(low..high)
            }
        };

        let temperature_delta = rng.random_range(-TEMPERATURE_SPREAD_C..=TEMPERATURE_SPREAD_C);
        let base_temperature = fields
            .temperature_c
            .or_else(|| metar.and_then(|m| m.temperature_c))
            .map_or(DEFAULT_TEMPERATURE_C, f64::from);
        let temperature_c = base_temperature + temperature_delta;
        let dewpoint_c = fields
            .dewpoint_c
            .or_else(|| metar.and_then(|m| m.dewpoint_c))
            .map(|dewpoint| (f64::from(dewpoint) + temperature_delta).min(temperature_c));

        let wind_delta = rng.random_range(-WIND_SPREAD_KT..=WIND_SPREAD_KT);
        let (wind_speed_kt, wind_direction_deg) = match &fields.wind {
            Some(wind) => (f64::from(wind.speed_kt), wind.degrees()),
            None => {
                let metar_wind = metar.and_then(|m| m.wind.as_ref());
                let base = metar_wind.map_or(0.0, |wind| f64::from(wind.speed_kt));
                (
                    (base + wind_delta).max(0.0),
                    metar_wind.and_then(|wind| wind.degrees()),
                )
            }
        };

        Some(TimelinePoint {
            time,
            location: input.airport.to_string(),
            visibility_sm,
            temperature_c,
            dewpoint_c,
            wind_speed_kt,
            wind_direction_deg,
            weather_description: weather_description(&fields),
            cloud_description: cloud_description(&fields),
            weather_icon: weather_icon(&fields),
            flight_category,
            change_kind,
        })
    }
}
