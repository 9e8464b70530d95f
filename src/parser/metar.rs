//! METAR / SPECI decoding

use chrono::{DateTime, Utc};
use tracing::debug;

use super::tokens::{parse_day_time_group, scan_conditions};
use crate::models::ParsedObservation;
use crate::{Result, SkyBriefError};

/// Four alphanumeric characters starting with a letter
pub(crate) fn is_station_code(token: &str) -> bool {
    token.len() == 4
        && token.starts_with(|c: char| c.is_ascii_uppercase())
        && token
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Decode a METAR. Station and observation time are mandatory.
pub fn parse(raw_text: &str, anchor: DateTime<Utc>) -> Result<ParsedObservation> {
    let upper = raw_text.to_uppercase();
    let all_tokens: Vec<&str> = upper.split_whitespace().collect();
    let mut tokens = all_tokens.as_slice();

    while let Some((&first, rest)) = tokens.split_first() {
        if matches!(first, "METAR" | "SPECI") {
            tokens = rest;
        } else {
            break;
        }
    }

    let mut modifier = None;
    if let Some((&"COR", rest)) = tokens.split_first() {
        modifier = Some("COR".to_string());
        tokens = rest;
    }

    let station = match tokens.split_first() {
        Some((&station, rest)) if is_station_code(station) => {
            tokens = rest;
            station.to_string()
        }
        _ => return Err(SkyBriefError::parse("missing station identifier", raw_text)),
    };

    let reference_time = match tokens.split_first() {
        Some((&group, rest)) => {
            let time = parse_day_time_group(group, anchor).ok_or_else(|| {
                SkyBriefError::parse("malformed observation time group", raw_text)
            })?;
            tokens = rest;
            time
        }
        None => return Err(SkyBriefError::parse("missing observation time", raw_text)),
    };

    if let Some((&first, rest)) = tokens.split_first() {
        if matches!(first, "AUTO" | "COR") {
            modifier = Some(first.to_string());
            tokens = rest;
        }
    }

    let fields = scan_conditions(tokens);
    let flight_category = fields.flight_category();
    debug!(station = %station, category = %flight_category, "Decoded METAR");

    Ok(ParsedObservation {
        station,
        reference_time,
        modifier,
        fields,
        flight_category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_category::FlightCategory;
    use crate::models::{Ceiling, Visibility};
    use chrono::TimeZone;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 12, 19, 30, 0).unwrap()
    }

    #[test]
    fn test_parse_full_metar() {
        let metar = parse(
            "METAR KJFK 121851Z 31012G20KT 10SM FEW050 SCT250 18/06 A3012 RMK AO2 SLP201",
            anchor(),
        )
        .unwrap();
        assert_eq!(metar.station, "KJFK");
        assert_eq!(
            metar.reference_time,
            Utc.with_ymd_and_hms(2025, 6, 12, 18, 51, 0).unwrap()
        );
        assert_eq!(metar.fields.visibility, Some(Visibility::StatuteMiles(10.0)));
        assert_eq!(metar.fields.ceiling, Some(Ceiling::Unlimited));
        assert_eq!(metar.fields.temperature_c, Some(18));
        assert_eq!(metar.flight_category, FlightCategory::Vfr);
    }

    #[test]
    fn test_parse_ifr_metar_with_modifier() {
        let metar =
            parse("KSFO 121856Z AUTO 27008KT 1 1/2SM BR OVC007 14/13 A2998", anchor()).unwrap();
        assert_eq!(metar.modifier.as_deref(), Some("AUTO"));
        assert_eq!(metar.fields.visibility, Some(Visibility::StatuteMiles(1.5)));
        assert_eq!(metar.fields.ceiling, Some(Ceiling::Feet(700)));
        assert_eq!(metar.flight_category, FlightCategory::Ifr);
    }

    #[test]
    fn test_missing_sky_group_gives_no_ceiling() {
        let metar = parse("EGLL 121850Z 24008KT 9999 16/09 Q1018", anchor()).unwrap();
        assert!(metar.fields.ceiling.is_none());
        assert_eq!(metar.fields.visibility, Some(Visibility::Unlimited));
        assert_eq!(metar.flight_category, FlightCategory::Vfr);
    }

    #[test]
    fn test_missing_mandatory_groups() {
        let no_station = parse("METAR 121851Z 31012KT", anchor()).unwrap_err();
        assert!(no_station.to_string().contains("missing station"));

        let bad_time = parse("KJFK 12185Z 31012KT", anchor()).unwrap_err();
        assert!(matches!(bad_time, SkyBriefError::Parse { .. }));

        let no_time = parse("KJFK", anchor()).unwrap_err();
        assert!(no_time.to_string().contains("missing observation time"));
    }

    #[test]
    fn test_no_visibility_or_ceiling_is_unknown() {
        let metar = parse("KJFK 121851Z 31012KT 18/06 A3012", anchor()).unwrap();
        assert_eq!(metar.flight_category, FlightCategory::Unknown);
        assert!(metar.fields.visibility.is_none());
    }
}
