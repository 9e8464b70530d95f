//! NOTAM interpretation: category, severity, summary and validity

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::debug;

use crate::models::{NotamCategory, NotamRecord, NotamSeverity};
use crate::{Result, SkyBriefError};

const SUMMARY_MAX_CHARS: usize = 80;
const LONG_NOTICE_CHARS: usize = 100;

/// Keyword table checked in order; the first matching category wins
const CATEGORY_KEYWORDS: &[(NotamCategory, &[&str])] = &[
    (NotamCategory::Runway, &["RWY", "RUNWAY", "CLSD", "CLOSED"]),
    (
        NotamCategory::Navigation,
        &["ILS", "VOR", "DME", "TACAN", "GPS", "RNAV"],
    ),
    (NotamCategory::Lighting, &["LGT", "LIGHT", "LIGHTS", "PAPI", "VASI"]),
    (
        NotamCategory::Airspace,
        &["AIRSPACE", "TMA", "CTR", "RESTRICTED"],
    ),
    (
        NotamCategory::Construction,
        &["CONSTRUCTION", "MAINT", "WORK", "WIP", "CRANE"],
    ),
    (
        NotamCategory::WeatherServices,
        &["ATIS", "AWOS", "ASOS", "WX"],
    ),
];

const HIGH_SEVERITY: &[&str] = &["CLSD", "CLOSED", "U/S", "UNSERVICEABLE"];
const MEDIUM_SEVERITY: &[&str] = &["CONSTRUCTION", "CRANE", "RESTRICTED"];
const LOW_SEVERITY: &[&str] = &["ATIS", "FREQ", "INFO"];
const OPERATIONAL_IMPACT: &[&str] = &[
    "CLSD",
    "CLOSED",
    "U/S",
    "UNSERVICEABLE",
    "RWY",
    "ILS",
    "CRANE",
];

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_whitespace() || matches!(c, '.' | ',' | '(' | ')'))
        .filter(|word| !word.is_empty())
}

fn has_any(text: &str, keywords: &[&str]) -> bool {
    words(text).any(|word| keywords.contains(&word))
}

fn categorize(text: &str) -> NotamCategory {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| has_any(text, keywords))
        .map_or(NotamCategory::Other, |(category, _)| *category)
}

fn assess_severity(text: &str) -> NotamSeverity {
    if has_any(text, HIGH_SEVERITY) {
        NotamSeverity::High
    } else if has_any(text, MEDIUM_SEVERITY) {
        NotamSeverity::Medium
    } else if has_any(text, LOW_SEVERITY) {
        NotamSeverity::Low
    } else {
        NotamSeverity::Medium
    }
}

fn summarize(text: &str) -> String {
    let closed = has_any(text, &["CLSD", "CLOSED"]);
    if has_any(text, &["RWY", "RUNWAY"]) && closed {
        let designator = words(text)
            .skip_while(|word| !matches!(*word, "RWY" | "RUNWAY"))
            .nth(1)
            .filter(|word| word.starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or("unknown");
        return format!("Runway {designator} is closed");
    }
    if has_any(text, &["ILS"]) && has_any(text, &["U/S", "UNSERVICEABLE"]) {
        return "ILS approach system unavailable".to_string();
    }
    if has_any(text, &["CONSTRUCTION", "WORK", "WIP", "MAINT"]) {
        return "Construction/maintenance work in progress".to_string();
    }
    if has_any(text, &["CRANE"]) {
        return "Crane operation affecting airspace".to_string();
    }
    if has_any(text, &["ATIS"]) {
        return "ATIS frequency or service change".to_string();
    }

    let length = text.chars().count();
    if length > LONG_NOTICE_CHARS {
        "Operational notice - see full text for details".to_string()
    } else if length > SUMMARY_MAX_CHARS {
        let truncated: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

/// `YYMMDDhhmm` as used in ICAO B) and C) items
fn parse_notam_time(text: &str) -> Option<DateTime<Utc>> {
    let digits = text.trim_end_matches("EST");
    if digits.len() != 10 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = 2000 + digits[0..2].parse::<i32>().ok()?;
    let month = digits[2..4].parse().ok()?;
    let day = digits[4..6].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let naive = date.and_hms_opt(digits[6..8].parse().ok()?, digits[8..10].parse().ok()?, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Series-number identifier such as `A1234/25` or the domestic `06/123`
fn is_notam_id(token: &str) -> bool {
    let Some((number, year)) = token.split_once('/') else {
        return false;
    };
    let digits = |text: &str| !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    let icao = number.len() == 5
        && number.starts_with(|c: char| c.is_ascii_uppercase())
        && digits(&number[1..])
        && year.len() == 2
        && digits(year);
    let domestic = number.len() == 2 && digits(number) && year.len() == 3 && digits(year);
    icao || domestic
}

/// Item text following `label` (e.g. `B)`), up to the next item
fn item_value<'a>(tokens: &[&'a str], label: &str) -> Option<&'a str> {
    let position = tokens.iter().position(|token| token.starts_with(label))?;
    let inline = &tokens[position][label.len()..];
    if inline.is_empty() {
        tokens.get(position + 1).copied()
    } else {
        Some(inline)
    }
}

/// Interpret a NOTAM. Only a non-empty text is required.
pub fn parse(raw_text: &str) -> Result<NotamRecord> {
    let upper = raw_text.trim().to_uppercase();
    if upper.is_empty() {
        return Err(SkyBriefError::parse("empty NOTAM text", raw_text));
    }
    let tokens: Vec<&str> = upper.split_whitespace().collect();

    let id = tokens
        .iter()
        .find(|token| is_notam_id(token))
        .map_or_else(|| "UNNUMBERED".to_string(), |token| (*token).to_string());

    let mut start_time = item_value(&tokens, "B)").and_then(parse_notam_time);
    let mut end_time = item_value(&tokens, "C)").and_then(parse_notam_time);

    // domestic `YYMMDDhhmm-YYMMDDhhmm` validity
    if start_time.is_none() && end_time.is_none() {
        if let Some((from, to)) = tokens
            .iter()
            .filter_map(|token| token.split_once('-'))
            .find_map(|(from, to)| Some((parse_notam_time(from)?, parse_notam_time(to)?)))
        {
            start_time = Some(from);
            end_time = Some(to);
        }
    }

    // the E) item carries the plain-language text of an ICAO NOTAM
    let text = match upper.find("E)") {
        Some(position) => upper[position + 2..]
            .split(" F)")
            .next()
            .unwrap_or_default()
            .trim()
            .to_string(),
        None => upper.clone(),
    };

    let record = NotamRecord {
        id,
        category: categorize(&text),
        severity: assess_severity(&text),
        start_time,
        end_time,
        summary: summarize(&text),
        affects_operations: has_any(&text, OPERATIONAL_IMPACT),
        raw_text: raw_text.trim().to_string(),
    };
    debug!(id = %record.id, category = %record.category, "Interpreted NOTAM");
    Ok(record)
}
