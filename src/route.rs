//! Flight-plan text parsing and route validation

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{BriefingRequest, RawReport};
use crate::{Result, SkyBriefError};

/// Four-letter words that show up in flight plans but are not airports
const NON_AIRPORT_WORDS: &[&str] = &[
    "FUEL", "TIME", "DIST", "PLAN", "ROUTE", "FLIGHT", "FROM", "DEST", "DEPA", "ARRI", "WAYP",
    "ALTN", "RMKS", "INFO", "DATA", "FILE", "ACFT", "TYPE",
];

fn is_alpha_code(word: &str, lengths: std::ops::RangeInclusive<usize>) -> bool {
    lengths.contains(&word.len()) && word.bytes().all(|b| b.is_ascii_uppercase())
}

/// Four ASCII letters
#[must_use]
pub fn is_icao_code(code: &str) -> bool {
    is_alpha_code(code, 4..=4)
}

fn words(text: &str) -> Vec<String> {
    text.to_uppercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Code following `keyword`, e.g. the `X` in `FROM X`
fn code_after<'a>(words: &'a [String], keyword: &str) -> Option<&'a str> {
    words
        .windows(2)
        .find(|pair| pair[0] == keyword && is_alpha_code(&pair[1], 3..=4))
        .map(|pair| pair[1].as_str())
}

/// Ordered, de-duplicated airport codes found in free text.
///
/// Accepts `KJFK KORD`, `KJFK..KORD`, `KJFK->KORD`, `FROM KJFK TO KORD` and
/// `DEP: KJFK ARR: KORD`. A departure or arrival named only through
/// `FROM`/`TO` or `DEP`/`ARR` is placed first or last.
#[must_use]
pub fn extract_airports(text: &str) -> Vec<String> {
    let words = words(text);
    let mut airports: Vec<String> = Vec::new();

    let mut skip_next = false;
    for word in &words {
        if skip_next {
            skip_next = false;
            continue;
        }
        if word == "ACFT" || word == "TYPE" {
            skip_next = true;
            continue;
        }
        if is_icao_code(word) && !NON_AIRPORT_WORDS.contains(&word.as_str()) {
            airports.push(word.clone());
        }
    }

    let endpoints = [("FROM", "TO"), ("DEP", "ARR")];
    for (departure_word, arrival_word) in endpoints {
        if let Some(departure) = code_after(&words, departure_word) {
            if !airports.iter().any(|a| a == departure) {
                airports.insert(0, departure.to_string());
            }
        }
        if let Some(arrival) = code_after(&words, arrival_word) {
            if !airports.iter().any(|a| a == arrival) {
                airports.push(arrival.to_string());
            }
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(airports.len());
    for airport in airports {
        if !unique.contains(&airport) {
            unique.push(airport);
        }
    }
    unique
}

/// `FL350`, `35000 FT`, `35000FT` or `ALT 12000`
fn extract_altitude(words: &[String]) -> Option<u32> {
    let digits = |text: &str| !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    words.iter().enumerate().find_map(|(index, word)| {
        let next = words.get(index + 1).map(String::as_str);
        if let Some(level) = word.strip_prefix("FL").filter(|l| l.len() == 3 && digits(l)) {
            return level.parse::<u32>().ok().map(|level| level * 100);
        }
        if let Some(feet) = word
            .strip_suffix("FT")
            .filter(|f| (3..=5).contains(&f.len()) && digits(f))
        {
            return feet.parse().ok();
        }
        if (3..=5).contains(&word.len()) && digits(word) && next == Some("FT") {
            return word.parse().ok();
        }
        if word == "ALT" {
            return next
                .filter(|n| (3..=5).contains(&n.len()) && digits(n))
                .and_then(|n| n.parse().ok());
        }
        None
    })
}

fn extract_aircraft_type(words: &[String]) -> Option<String> {
    words
        .windows(2)
        .find(|pair| {
            (pair[0] == "ACFT" || pair[0] == "TYPE")
                && (2..=4).contains(&pair[1].len())
                && pair[1].bytes().all(|b| b.is_ascii_alphanumeric())
        })
        .map(|pair| pair[1].clone())
}

/// Upper-cases the codes and checks there are at least two valid ICAO codes
pub fn validate_route(route: &[String]) -> Result<Vec<String>> {
    let normalized: Vec<String> = route.iter().map(|code| code.trim().to_uppercase()).collect();
    if normalized.len() < 2 {
        return Err(SkyBriefError::validation(format!(
            "route needs at least two airports, got {}",
            normalized.len()
        )));
    }
    if let Some(invalid) = normalized.iter().find(|code| !is_icao_code(code)) {
        return Err(SkyBriefError::validation(format!(
            "invalid ICAO airport code '{invalid}'"
        )));
    }
    Ok(normalized)
}

/// Route details extracted from free flight-plan text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    pub airports: Vec<String>,
    pub cruise_altitude_ft: Option<u32>,
    pub aircraft_type: Option<String>,
    pub raw_text: String,
}

impl FlightPlan {
    /// Parse and validate a flight plan
    pub fn parse(text: &str) -> Result<Self> {
        let words = words(text);
        let airports = validate_route(&extract_airports(text))?;
        let plan = Self {
            airports,
            cruise_altitude_ft: extract_altitude(&words),
            aircraft_type: extract_aircraft_type(&words),
            raw_text: text.to_string(),
        };
        debug!(
            airports = ?plan.airports,
            altitude = ?plan.cruise_altitude_ft,
            "Parsed flight plan"
        );
        Ok(plan)
    }

    #[must_use]
    pub fn departure(&self) -> &str {
        self.airports.first().map_or("", String::as_str)
    }

    #[must_use]
    pub fn arrival(&self) -> &str {
        self.airports.last().map_or("", String::as_str)
    }

    /// Airports between departure and arrival
    #[must_use]
    pub fn waypoints(&self) -> &[String] {
        match self.airports.len() {
            0..=2 => &[],
            len => &self.airports[1..len - 1],
        }
    }

    /// Briefing request for this route
    #[must_use]
    pub fn into_request(self, reports: Vec<RawReport>) -> BriefingRequest {
        let mut request = BriefingRequest::new(self.airports, reports);
        request.cruise_altitude_ft = self.cruise_altitude_ft;
        request.aircraft_type = self.aircraft_type;
        request
    }
}
