//! TAF decoding into ordered forecast periods

use chrono::{DateTime, Utc};
use tracing::debug;

use super::metar::is_station_code;
use super::tokens::{parse_day_time_group, parse_period_group, resolve_day_time, scan_conditions};
use crate::models::{ChangeKind, ForecastPeriod, ObservationFields, TafForecast};
use crate::{Result, SkyBriefError};

/// Wind at or above this is flagged as a significant forecast change
const SIGNIFICANT_WIND_KT: u32 = 25;
/// Visibility at or below this is flagged as a significant forecast change
const SIGNIFICANT_VISIBILITY_SM: f64 = 3.0;

/// A change-group header found while splitting the body
#[derive(Debug)]
struct GroupHeader {
    kind: ChangeKind,
    probability_pct: Option<u8>,
    /// `FMddhhmm` start time
    from_time: Option<DateTime<Utc>>,
}

fn parse_fm(token: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let digits = token.strip_prefix("FM")?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    resolve_day_time(
        digits[0..2].parse().ok()?,
        digits[2..4].parse().ok()?,
        digits[4..6].parse().ok()?,
        anchor,
    )
}

fn parse_probability(token: &str) -> Option<u8> {
    let digits = token.strip_prefix("PROB")?;
    if digits.len() != 2 {
        return None;
    }
    digits.parse().ok()
}

/// Changes worth calling out to a pilot
fn significant_changes(fields: &ObservationFields) -> Vec<String> {
    let mut changes = Vec::new();
    for phenomenon in fields.weather_groups() {
        if phenomenon.is_thunderstorm()
            || phenomenon.is_heavy_precipitation()
            || phenomenon.is_freezing()
            || phenomenon.is_snow()
        {
            changes.push(phenomenon.description());
        }
    }
    if let Some(miles) = fields.visibility.and_then(|v| v.statute_miles()) {
        if miles <= SIGNIFICANT_VISIBILITY_SM {
            changes.push(format!("low visibility ({miles} SM)"));
        }
    }
    if let Some(wind) = &fields.wind {
        if wind.gust_kt.is_some() || wind.peak_kt() >= SIGNIFICANT_WIND_KT {
            changes.push(format!("strong winds ({} kt)", wind.peak_kt()));
        }
    }
    changes
}

/// Decode a TAF. The validity window is mandatory.
pub fn parse(raw_text: &str, anchor: DateTime<Utc>) -> Result<TafForecast> {
    let upper = raw_text.to_uppercase();
    let all_tokens: Vec<&str> = upper.split_whitespace().collect();
    let mut tokens = all_tokens.as_slice();
    let mut amendment = false;

    while let Some((&first, rest)) = tokens.split_first() {
        match first {
            "TAF" | "COR" => tokens = rest,
            "AMD" => {
                amendment = true;
                tokens = rest;
            }
            _ => break,
        }
    }

    let station = match tokens.split_first() {
        Some((&station, rest)) if is_station_code(station) => {
            tokens = rest;
            station.to_string()
        }
        _ => return Err(SkyBriefError::parse("missing station identifier", raw_text)),
    };

    let mut issue_time = None;
    if let Some((&group, rest)) = tokens.split_first() {
        if let Some(time) = parse_day_time_group(group, anchor) {
            issue_time = Some(time);
            tokens = rest;
        }
    }

    let (valid_from, valid_to) = match tokens.split_first() {
        Some((&group, rest)) => {
            let window = parse_period_group(group, issue_time.unwrap_or(anchor))
                .filter(|(from, to)| from < to)
                .ok_or_else(|| SkyBriefError::parse("malformed validity window", raw_text))?;
            tokens = rest;
            window
        }
        None => return Err(SkyBriefError::parse("missing validity window", raw_text)),
    };

    // Split the remaining body into (header, condition tokens) groups
    let mut groups: Vec<(GroupHeader, Option<(DateTime<Utc>, DateTime<Utc>)>, Vec<&str>)> =
        vec![(
            GroupHeader {
                kind: ChangeKind::Base,
                probability_pct: None,
                from_time: Some(valid_from),
            },
            Some((valid_from, valid_to)),
            Vec::new(),
        )];
    let mut index = 0;
    while index < tokens.len() {
        let token = tokens[index];
        index += 1;

        if token == "RMK" {
            break;
        }

        let header = if let Some(from_time) = parse_fm(token, valid_from) {
            Some(GroupHeader {
                kind: ChangeKind::Fm,
                probability_pct: None,
                from_time: Some(from_time),
            })
        } else if token == "BECMG" || token == "TEMPO" {
            let kind = if token == "BECMG" {
                ChangeKind::Becmg
            } else {
                ChangeKind::Tempo
            };
            Some(GroupHeader {
                kind,
                probability_pct: None,
                from_time: None,
            })
        } else if let Some(probability) = parse_probability(token) {
            // PROB30 TEMPO is a single probabilistic group
            if tokens.get(index) == Some(&"TEMPO") {
                index += 1;
            }
            Some(GroupHeader {
                kind: ChangeKind::Prob,
                probability_pct: Some(probability),
                from_time: None,
            })
        } else {
            None
        };

        match header {
            Some(header) => {
                let window = if header.kind == ChangeKind::Fm {
                    header.from_time.map(|from| (from, valid_to))
                } else {
                    let window = tokens
                        .get(index)
                        .and_then(|group| parse_period_group(group, valid_from));
                    if window.is_some() {
                        index += 1;
                    }
                    window
                };
                groups.push((header, window, Vec::new()));
            }
            None => {
                if let Some((_, _, body)) = groups.last_mut() {
                    body.push(token);
                }
            }
        }
    }

    // FM groups end where the next one starts
    let fm_starts: Vec<DateTime<Utc>> = groups
        .iter()
        .filter(|(header, _, _)| header.kind == ChangeKind::Fm)
        .filter_map(|(header, _, _)| header.from_time)
        .collect();
    let prevailing_end = |from: DateTime<Utc>| -> DateTime<Utc> {
        fm_starts
            .iter()
            .copied()
            .filter(|start| *start > from)
            .min()
            .unwrap_or(valid_to)
    };

    let mut periods = Vec::with_capacity(groups.len());
    for (header, window, body) in groups {
        let Some((from, to)) = window else {
            debug!(
                station = %station,
                kind = %header.kind,
                "Skipping change group without a window"
            );
            continue;
        };
        let (period_from, period_to) = match header.kind {
            ChangeKind::Base | ChangeKind::Fm => (from, prevailing_end(from)),
            ChangeKind::Becmg => (from, to),
            ChangeKind::Tempo | ChangeKind::Prob => (from.max(valid_from), to.min(valid_to)),
        };
        if period_from >= period_to {
            debug!(station = %station, kind = %header.kind, "Skipping empty change group");
            continue;
        }

        let fields = scan_conditions(&body);
        periods.push(ForecastPeriod {
            valid_from: period_from,
            valid_to: period_to,
            change_kind: header.kind,
            probability_pct: header.probability_pct,
            significant_changes: significant_changes(&fields),
            fields,
        });
    }

    debug!(station = %station, periods = periods.len(), "Decoded TAF");

    Ok(TafForecast {
        station,
        issue_time,
        valid_from,
        valid_to,
        amendment,
        periods,
    })
}
