//! Group decoders shared by METAR and TAF parsing

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, TimeZone, Utc};

use crate::models::{
    Ceiling, ConvectiveCloud, Descriptor, Intensity, ObservationFields, PhenomenonCode,
    SkyCoverage, SkyLayer, Visibility, WeatherPhenomenon, Wind, WindDirection,
};

const METERS_PER_STATUTE_MILE: f64 = 1609.344;
const KNOTS_PER_MPS: f64 = 1.943_84;
const INHG_PER_HPA: f64 = 0.029_53;

fn all_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Resolve a day/hour/minute group to the calendar month nearest `anchor`.
///
/// Hour 24 means midnight at the end of the given day.
#[must_use]
pub fn resolve_day_time(
    day: u32,
    hour: u32,
    minute: u32,
    anchor: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if day == 0 || day > 31 || hour > 24 || minute > 59 || (hour == 24 && minute != 0) {
        return None;
    }
    let (hour, rollover) = if hour == 24 { (0, 1) } else { (hour, 0) };
    let month_start = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1)?;

    [
        month_start.checked_sub_months(Months::new(1)),
        Some(month_start),
        month_start.checked_add_months(Months::new(1)),
    ]
    .into_iter()
    .flatten()
    .filter_map(|start| {
        let date = start.with_day(day)?;
        let naive = date.and_hms_opt(hour, minute, 0)? + Duration::days(rollover);
        Some(Utc.from_utc_datetime(&naive))
    })
    .min_by_key(|candidate| (*candidate - anchor).num_seconds().abs())
}

/// `ddhhmmZ` issue or observation time
#[must_use]
pub fn parse_day_time_group(token: &str, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let digits = token.strip_suffix('Z')?;
    if digits.len() != 6 || !all_digits(digits) {
        return None;
    }
    let day = digits[0..2].parse().ok()?;
    let hour = digits[2..4].parse().ok()?;
    let minute = digits[4..6].parse().ok()?;
    resolve_day_time(day, hour, minute, anchor)
}

/// `ddhh/ddhh` validity or change window
#[must_use]
pub fn parse_period_group(
    token: &str,
    anchor: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = token.split_once('/')?;
    if start.len() != 4 || end.len() != 4 || !all_digits(start) || !all_digits(end) {
        return None;
    }
    let from = resolve_day_time(start[0..2].parse().ok()?, start[2..4].parse().ok()?, 0, anchor)?;
    let to = resolve_day_time(end[0..2].parse().ok()?, end[2..4].parse().ok()?, 0, from)?;
    Some((from, to))
}

/// Wind group `dddff(Gff)KT`, `VRBffKT` or the `MPS` variant
#[must_use]
pub fn parse_wind(token: &str) -> Option<Wind> {
    let (body, factor) = if let Some(body) = token.strip_suffix("KT") {
        (body, 1.0)
    } else if let Some(body) = token.strip_suffix("MPS") {
        (body, KNOTS_PER_MPS)
    } else {
        return None;
    };
    if body.len() < 5 {
        return None;
    }

    let (direction_text, speeds) = body.split_at(3);
    let direction = if direction_text == "VRB" {
        WindDirection::Variable
    } else if all_digits(direction_text) {
        let degrees: u16 = direction_text.parse().ok()?;
        if degrees > 360 {
            return None;
        }
        WindDirection::Degrees(degrees)
    } else {
        return None;
    };

    let (speed_text, gust_text) = match speeds.split_once('G') {
        Some((speed, gust)) => (speed, Some(gust)),
        None => (speeds, None),
    };
    if !(2..=3).contains(&speed_text.len()) || !all_digits(speed_text) {
        return None;
    }
    let convert = |value: u32| -> u32 {
        if factor == 1.0 {
            value
        } else {
            (f64::from(value) * factor).round() as u32
        }
    };
    let speed_kt = convert(speed_text.parse().ok()?);
    let gust_kt = match gust_text {
        Some(gust) if (2..=3).contains(&gust.len()) && all_digits(gust) => {
            Some(convert(gust.parse().ok()?))
        }
        Some(_) => return None,
        None => None,
    };

    Some(Wind {
        direction,
        speed_kt,
        gust_kt,
        variable_range: None,
    })
}

/// Variable direction range `dddVddd`
#[must_use]
pub fn parse_variable_range(token: &str) -> Option<(u16, u16)> {
    let (from, to) = token.split_once('V')?;
    if from.len() != 3 || to.len() != 3 || !all_digits(from) || !all_digits(to) {
        return None;
    }
    Some((from.parse().ok()?, to.parse().ok()?))
}

fn parse_fraction(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.parse().ok()?;
            let denominator: f64 = denominator.parse().ok()?;
            if denominator == 0.0 {
                return None;
            }
            Some(numerator / denominator)
        }
        None => text.parse().ok(),
    }
}

/// Visibility group starting at `tokens[0]`.
///
/// Returns the value and the number of tokens consumed (two for `1 1/2SM`).
#[must_use]
pub fn parse_visibility(tokens: &[&str]) -> Option<(Visibility, usize)> {
    let token = *tokens.first()?;

    if let Some(miles) = token.strip_suffix("SM") {
        if miles.starts_with('P') {
            return Some((Visibility::Unlimited, 1));
        }
        let miles = miles.strip_prefix('M').unwrap_or(miles);
        return parse_fraction(miles).map(|value| (Visibility::StatuteMiles(value), 1));
    }

    // whole miles followed by a fraction
    if token.len() == 1 && all_digits(token) {
        let next = tokens.get(1)?;
        let fraction = next.strip_suffix("SM").filter(|text| text.contains('/'))?;
        let whole: f64 = token.parse().ok()?;
        return parse_fraction(fraction).map(|value| (Visibility::StatuteMiles(whole + value), 2));
    }

    // meters, optionally with a direction suffix such as NDV
    let meters = token.get(0..4).filter(|digits| all_digits(digits))?;
    let suffix = &token[4..];
    if !(suffix.is_empty() || suffix == "NDV") {
        return None;
    }
    if meters == "9999" {
        return Some((Visibility::Unlimited, 1));
    }
    let meters: f64 = meters.parse().ok()?;
    Some((Visibility::StatuteMiles(round2(meters / METERS_PER_STATUTE_MILE)), 1))
}

/// Sky group such as `BKN025CB`, `VV002` or `SKC`
#[must_use]
pub fn parse_sky_layer(token: &str) -> Option<SkyLayer> {
    if let Some(coverage) = SkyCoverage::from_code(token).filter(SkyCoverage::is_clear) {
        return Some(SkyLayer {
            coverage,
            height_ft: None,
            convective: None,
        });
    }

    let prefix_len = if token.starts_with("VV") { 2 } else { 3 };
    let coverage = SkyCoverage::from_code(token.get(0..prefix_len)?)?;
    if coverage.is_clear() {
        return None;
    }
    let height_text = token.get(prefix_len..prefix_len + 3)?;
    let height_ft = if height_text == "///" {
        None
    } else if all_digits(height_text) {
        Some(height_text.parse::<u32>().ok()? * 100)
    } else {
        return None;
    };
    let convective = match &token[prefix_len + 3..] {
        "" | "///" => None,
        "CB" => Some(ConvectiveCloud::Cb),
        "TCU" => Some(ConvectiveCloud::Tcu),
        _ => return None,
    };

    Some(SkyLayer {
        coverage,
        height_ft,
        convective,
    })
}

/// Lowest broken, overcast or obscured layer; unlimited when there is none
#[must_use]
pub fn ceiling_from_layers(layers: &[SkyLayer]) -> Ceiling {
    layers
        .iter()
        .filter(|layer| layer.coverage.is_ceiling())
        .filter_map(|layer| layer.height_ft)
        .min()
        .map_or(Ceiling::Unlimited, Ceiling::Feet)
}

fn parse_signed_temperature(text: &str) -> Option<i32> {
    let (negative, digits) = match text.strip_prefix('M') {
        Some(digits) => (true, digits),
        None => (false, text),
    };
    if digits.len() != 2 || !all_digits(digits) {
        return None;
    }
    let value: i32 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Temperature/dewpoint group `MM/MM`; the dewpoint may be missing
#[must_use]
pub fn parse_temperature(token: &str) -> Option<(i32, Option<i32>)> {
    let (temperature, dewpoint) = token.split_once('/')?;
    let temperature = parse_signed_temperature(temperature)?;
    let dewpoint = if dewpoint.is_empty() || dewpoint == "//" {
        None
    } else {
        Some(parse_signed_temperature(dewpoint)?)
    };
    Some((temperature, dewpoint))
}

/// Altimeter setting in inches of mercury from `Annnn` or `Qnnnn`
#[must_use]
pub fn parse_altimeter(token: &str) -> Option<f64> {
    let digits = token.get(1..)?;
    if digits.len() != 4 || !all_digits(digits) {
        return None;
    }
    let value: f64 = digits.parse().ok()?;
    match token.as_bytes()[0] {
        b'A' => Some(value / 100.0),
        b'Q' => Some(round2(value * INHG_PER_HPA)),
        _ => None,
    }
}

/// Present weather group. Recent-weather (`RE..`) groups are not current and
/// yield `None`.
#[must_use]
pub fn parse_weather(token: &str) -> Option<WeatherPhenomenon> {
    if token.starts_with("RE") {
        return None;
    }
    let (intensity, body) = if let Some(body) = token.strip_prefix('-') {
        (Intensity::Light, body)
    } else if let Some(body) = token.strip_prefix('+') {
        (Intensity::Heavy, body)
    } else if let Some(body) = token.strip_prefix("VC") {
        (Intensity::Vicinity, body)
    } else {
        (Intensity::Moderate, token)
    };
    if body.is_empty() || body.len() % 2 != 0 || !body.is_ascii() {
        return None;
    }

    let chunks: Vec<&str> = (0..body.len()).step_by(2).map(|i| &body[i..i + 2]).collect();
    let descriptor = Descriptor::from_code(chunks[0]);
    let code_chunks = if descriptor.is_some() {
        &chunks[1..]
    } else {
        &chunks[..]
    };
    let codes = code_chunks
        .iter()
        .map(|chunk| PhenomenonCode::from_code(chunk))
        .collect::<Option<Vec<_>>>()?;

    Some(WeatherPhenomenon {
        raw: token.to_string(),
        intensity,
        descriptor,
        codes,
    })
}

/// Decode the condition groups of a METAR body or a TAF change group.
///
/// Groups that are not recognised are skipped; `RMK` ends the scan. Only the
/// groups actually present end up set in the result.
#[must_use]
pub fn scan_conditions(tokens: &[&str]) -> ObservationFields {
    let mut fields = ObservationFields::default();
    let mut layers: Vec<SkyLayer> = Vec::new();
    let mut saw_sky = false;
    let mut cavok = false;
    let mut index = 0;

    while index < tokens.len() {
        let token = tokens[index];
        index += 1;

        if token == "RMK" {
            break;
        }
        if token == "CAVOK" {
            cavok = true;
            fields.visibility = Some(Visibility::Unlimited);
            fields.weather = Some(Vec::new());
            continue;
        }
        if token == "NSW" {
            fields.weather = Some(Vec::new());
            continue;
        }
        if fields.wind.is_none() {
            if let Some(wind) = parse_wind(token) {
                fields.wind = Some(wind);
                continue;
            }
        }
        if let Some(range) = parse_variable_range(token) {
            if let Some(wind) = fields.wind.as_mut() {
                wind.variable_range = Some(range);
            }
            continue;
        }
        if fields.visibility.is_none() {
            if let Some((visibility, consumed)) = parse_visibility(&tokens[index - 1..]) {
                fields.visibility = Some(visibility);
                index += consumed - 1;
                continue;
            }
        }
        if let Some(layer) = parse_sky_layer(token) {
            saw_sky = true;
            if !layer.coverage.is_clear() {
                layers.push(layer);
            }
            continue;
        }
        if let Some((temperature, dewpoint)) = parse_temperature(token) {
            fields.temperature_c = Some(temperature);
            fields.dewpoint_c = dewpoint;
            continue;
        }
        if let Some(altimeter) = parse_altimeter(token) {
            fields.altimeter_inhg = Some(altimeter);
            continue;
        }
        if cavok {
            continue;
        }
        if let Some(phenomenon) = parse_weather(token) {
            fields.weather.get_or_insert_with(Vec::new).push(phenomenon);
        }
    }

    if cavok {
        fields.ceiling = Some(Ceiling::Unlimited);
        fields.sky_layers = Some(Vec::new());
    } else if saw_sky {
        fields.ceiling = Some(ceiling_from_layers(&layers));
        fields.sky_layers = Some(layers);
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 12, 19, 0, 0).unwrap()
    }

    #[test]
    fn test_resolve_day_time_nearest_month() {
        let same = resolve_day_time(12, 18, 51, anchor()).unwrap();
        assert_eq!(same, Utc.with_ymd_and_hms(2025, 6, 12, 18, 51, 0).unwrap());

        let july = Utc.with_ymd_and_hms(2025, 7, 1, 1, 0, 0).unwrap();
        let previous = resolve_day_time(30, 23, 0, july).unwrap();
        assert_eq!(previous, Utc.with_ymd_and_hms(2025, 6, 30, 23, 0, 0).unwrap());

        let rollover = resolve_day_time(12, 24, 0, anchor()).unwrap();
        assert_eq!(rollover, Utc.with_ymd_and_hms(2025, 6, 13, 0, 0, 0).unwrap());

        assert!(resolve_day_time(0, 10, 0, anchor()).is_none());
        assert!(resolve_day_time(12, 25, 0, anchor()).is_none());
    }

    #[test]
    fn test_period_group_crosses_month() {
        let anchor = Utc.with_ymd_and_hms(2025, 1, 31, 17, 0, 0).unwrap();
        let (from, to) = parse_period_group("3118/0124", anchor).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2025, 1, 31, 18, 0, 0).unwrap());
        assert_eq!(to, Utc.with_ymd_and_hms(2025, 2, 2, 0, 0, 0).unwrap());
    }

    #[rstest]
    #[case("31012KT", Some(310), 12, None)]
    #[case("27015G25KT", Some(270), 15, Some(25))]
    #[case("VRB03KT", None, 3, None)]
    #[case("00000KT", Some(0), 0, None)]
    #[case("24010MPS", Some(240), 19, None)]
    fn test_parse_wind(
        #[case] token: &str,
        #[case] degrees: Option<u16>,
        #[case] speed: u32,
        #[case] gust: Option<u32>,
    ) {
        let wind = parse_wind(token).unwrap();
        assert_eq!(wind.degrees(), degrees);
        assert_eq!(wind.speed_kt, speed);
        assert_eq!(wind.gust_kt, gust);
    }

    #[test]
    fn test_parse_wind_rejects_garbage() {
        assert!(parse_wind("KJFK").is_none());
        assert!(parse_wind("ABC12KT").is_none());
        assert!(parse_wind("27015GXXKT").is_none());
    }

    #[rstest]
    #[case(&["10SM"], Visibility::StatuteMiles(10.0), 1)]
    #[case(&["1/2SM"], Visibility::StatuteMiles(0.5), 1)]
    #[case(&["1", "1/2SM"], Visibility::StatuteMiles(1.5), 2)]
    #[case(&["M1/4SM"], Visibility::StatuteMiles(0.25), 1)]
    #[case(&["P6SM"], Visibility::Unlimited, 1)]
    #[case(&["9999"], Visibility::Unlimited, 1)]
    #[case(&["0800"], Visibility::StatuteMiles(0.5), 1)]
    fn test_parse_visibility(
        #[case] tokens: &[&str],
        #[case] expected: Visibility,
        #[case] consumed: usize,
    ) {
        assert_eq!(parse_visibility(tokens), Some((expected, consumed)));
    }

    #[test]
    fn test_parse_sky_layers() {
        let layer = parse_sky_layer("BKN025CB").unwrap();
        assert_eq!(layer.coverage, SkyCoverage::Bkn);
        assert_eq!(layer.height_ft, Some(2500));
        assert_eq!(layer.convective, Some(ConvectiveCloud::Cb));

        let vv = parse_sky_layer("VV002").unwrap();
        assert_eq!(vv.coverage, SkyCoverage::Vv);
        assert_eq!(vv.height_ft, Some(200));

        assert_eq!(parse_sky_layer("SKC").unwrap().coverage, SkyCoverage::Skc);
        assert!(parse_sky_layer("BKNXYZ").is_none());
    }

    #[test]
    fn test_parse_temperature_and_altimeter() {
        assert_eq!(parse_temperature("18/06"), Some((18, Some(6))));
        assert_eq!(parse_temperature("M05/M12"), Some((-5, Some(-12))));
        assert_eq!(parse_temperature("02/"), Some((2, None)));
        assert!(parse_temperature("1218/1324").is_none());
        assert_eq!(parse_altimeter("A3012"), Some(30.12));
        assert_eq!(parse_altimeter("Q1013"), Some(29.91));
        assert!(parse_altimeter("AUTO").is_none());
    }

    #[test]
    fn test_parse_weather_groups() {
        let storm = parse_weather("+TSRA").unwrap();
        assert_eq!(storm.intensity, Intensity::Heavy);
        assert_eq!(storm.descriptor, Some(Descriptor::Ts));
        assert_eq!(storm.codes, vec![PhenomenonCode::Ra]);

        let fog = parse_weather("FZFG").unwrap();
        assert!(fog.is_freezing());
        assert!(fog.is_fog());

        let showers = parse_weather("VCSH").unwrap();
        assert_eq!(showers.intensity, Intensity::Vicinity);
        assert!(showers.codes.is_empty());

        assert!(parse_weather("RERA").is_none());
        assert!(parse_weather("KJFK").is_none());
        assert!(parse_weather("AUTO").is_none());
    }

    #[test]
    fn test_scan_conditions() {
        let tokens = [
            "31012G22KT",
            "280V340",
            "3SM",
            "-RA",
            "BR",
            "BKN008",
            "OVC015",
            "12/10",
            "A2990",
            "RMK",
            "AO2",
        ];
        let fields = scan_conditions(&tokens);
        let wind = fields.wind.as_ref().unwrap();
        assert_eq!(wind.variable_range, Some((280, 340)));
        assert_eq!(fields.visibility, Some(Visibility::StatuteMiles(3.0)));
        assert_eq!(fields.ceiling, Some(Ceiling::Feet(800)));
        assert_eq!(fields.weather_groups().len(), 2);
        assert_eq!(fields.temperature_c, Some(12));
        assert_eq!(fields.altimeter_inhg, Some(29.90));
    }

    #[test]
    fn test_scan_cavok_and_missing_sky() {
        let cavok = scan_conditions(&["24008KT", "CAVOK", "RA", "22/14", "Q1018"]);
        assert_eq!(cavok.visibility, Some(Visibility::Unlimited));
        assert_eq!(cavok.ceiling, Some(Ceiling::Unlimited));
        assert!(cavok.weather_groups().is_empty());

        let no_sky = scan_conditions(&["24008KT", "10SM"]);
        assert!(no_sky.ceiling.is_none());
        assert!(no_sky.sky_layers.is_none());

        let few = scan_conditions(&["FEW050", "SCT100"]);
        assert_eq!(few.ceiling, Some(Ceiling::Unlimited));
    }
}
