//! Pilot report decoding

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use tracing::debug;

use crate::models::{
    IcingReport, IcingType, PirepIntensity, PirepKind, PirepRecord, TurbulenceReport,
    TurbulenceType,
};
use crate::{Result, SkyBriefError};

/// Highest intensity word in a field such as `LGT-MOD CHOP`
fn highest_intensity(text: &str) -> Option<PirepIntensity> {
    text.split(|c: char| c.is_whitespace() || c == '-')
        .filter_map(PirepIntensity::from_token)
        .max()
}

fn parse_turbulence(text: &str) -> Option<TurbulenceReport> {
    let intensity = highest_intensity(text)?;
    let kind = text.split_whitespace().find_map(|word| match word {
        "CAT" => Some(TurbulenceType::Cat),
        "CHOP" => Some(TurbulenceType::Chop),
        "LLWS" => Some(TurbulenceType::Llws),
        _ => None,
    });
    Some(TurbulenceReport {
        intensity,
        kind,
        raw: text.to_string(),
    })
}

fn parse_icing(text: &str) -> Option<IcingReport> {
    let intensity = highest_intensity(text)?;
    let kind = text.split_whitespace().find_map(|word| match word {
        "RIME" => Some(IcingType::Rime),
        "CLR" | "CLEAR" => Some(IcingType::Clr),
        "MXD" | "MIXED" => Some(IcingType::Mxd),
        _ => None,
    });
    Some(IcingReport {
        intensity,
        kind,
        raw: text.to_string(),
    })
}

/// `/TM hhmm` on the reference date, or the day before if that would be in the future
fn parse_report_time(text: &str, reference: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let digits = text.trim();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let time = NaiveTime::from_hms_opt(digits[0..2].parse().ok()?, digits[2..4].parse().ok()?, 0)?;
    let candidate = Utc.from_utc_datetime(&reference.date_naive().and_time(time));
    Some(if candidate > reference {
        candidate - Duration::days(1)
    } else {
        candidate
    })
}

/// `/FL080` altitude in feet; `UNKN` and similar yield `None`
fn parse_altitude(text: &str) -> Option<u32> {
    let digits = text.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().map(|hundreds| hundreds * 100)
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Decode a PIREP. The report body with its `/` field groups is mandatory.
pub fn parse(raw_text: &str, reference: DateTime<Utc>) -> Result<PirepRecord> {
    let upper = raw_text.trim().to_uppercase();
    if upper.is_empty() {
        return Err(SkyBriefError::parse("empty report body", raw_text));
    }
    let Some((header, body)) = upper.split_once('/') else {
        return Err(SkyBriefError::parse("missing report body", raw_text));
    };

    let kind = if header.split_whitespace().any(|word| word == "UUA") {
        PirepKind::Uua
    } else {
        PirepKind::Ua
    };

    let mut record = PirepRecord {
        kind,
        location: None,
        reported_time: None,
        aircraft_type: None,
        altitude_ft: None,
        turbulence: None,
        icing: None,
        sky: None,
        weather: None,
        wind_shear: false,
        remarks: None,
        age_hours: None,
        severity_score: 0,
    };

    let mut recognised = 0;
    for group in body.split('/') {
        let group = group.trim();
        let (code, value) = match (group.get(..2), group.get(2..)) {
            (Some(code), Some(value)) => (code, value.trim()),
            _ => (group, ""),
        };
        recognised += 1;
        match code {
            "OV" => record.location = non_empty(value),
            "TM" => record.reported_time = parse_report_time(value, reference),
            "FL" => record.altitude_ft = parse_altitude(value),
            "TP" => record.aircraft_type = non_empty(value),
            "SK" => record.sky = non_empty(value),
            "WX" => record.weather = non_empty(value),
            "TB" => record.turbulence = parse_turbulence(value),
            "IC" => record.icing = parse_icing(value),
            "RM" => record.remarks = non_empty(value),
            "WS" => record.wind_shear = true,
            _ => recognised -= 1,
        }
    }
    if recognised == 0 {
        return Err(SkyBriefError::parse("no recognised field groups", raw_text));
    }

    let shear_in = |text: &Option<String>| {
        text.as_deref()
            .is_some_and(|text| text.split_whitespace().any(|word| word == "LLWS" || word == "WS"))
    };
    record.wind_shear = record.wind_shear
        || record
            .turbulence
            .as_ref()
            .is_some_and(|tb| tb.kind == Some(TurbulenceType::Llws))
        || shear_in(&record.remarks);

    record.age_hours = record
        .reported_time
        .map(|time| (reference - time).num_minutes() as f64 / 60.0);
    record.severity_score = [
        record.turbulence.as_ref().map(|tb| tb.intensity.score()),
        record.icing.as_ref().map(|ic| ic.intensity.score()),
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or(0);

    debug!(
        location = ?record.location,
        severity = record.severity_score,
        "Decoded PIREP"
    );
    Ok(record)
}
