//! Observation model shared by METAR reports and resolved TAF periods

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::flight_category::{classify, FlightCategory};

/// Wind direction, either a true bearing or variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindDirection {
    Degrees(u16),
    Variable,
}

/// Surface wind group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub direction: WindDirection,
    /// Sustained speed in knots
    pub speed_kt: u32,
    /// Gust speed in knots
    pub gust_kt: Option<u32>,
    /// Variable direction range from a `dddVddd` group
    pub variable_range: Option<(u16, u16)>,
}

impl Wind {
    #[must_use]
    pub fn is_calm(&self) -> bool {
        self.speed_kt == 0 && self.gust_kt.is_none()
    }

    /// Bearing in degrees, `None` when variable
    #[must_use]
    pub fn degrees(&self) -> Option<u16> {
        match self.direction {
            WindDirection::Degrees(degrees) => Some(degrees),
            WindDirection::Variable => None,
        }
    }

    /// Highest of sustained and gust speed
    #[must_use]
    pub fn peak_kt(&self) -> u32 {
        self.gust_kt.unwrap_or(0).max(self.speed_kt)
    }
}

/// Prevailing visibility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    StatuteMiles(f64),
    /// CAVOK, `P6SM` or `9999`
    Unlimited,
}

impl Visibility {
    /// Numeric visibility, `None` when unlimited
    #[must_use]
    pub fn statute_miles(&self) -> Option<f64> {
        match self {
            Visibility::StatuteMiles(miles) => Some(*miles),
            Visibility::Unlimited => None,
        }
    }

    #[must_use]
    pub fn is_below(&self, limit_sm: f64) -> bool {
        self.statute_miles().is_some_and(|miles| miles < limit_sm)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::StatuteMiles(miles) if miles.fract() == 0.0 => write!(f, "{miles:.0} SM"),
            Visibility::StatuteMiles(miles) => write!(f, "{miles:.2} SM"),
            Visibility::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Height of the lowest broken, overcast or obscured layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ceiling {
    Feet(u32),
    Unlimited,
}

impl Ceiling {
    #[must_use]
    pub fn feet(&self) -> Option<u32> {
        match self {
            Ceiling::Feet(feet) => Some(*feet),
            Ceiling::Unlimited => None,
        }
    }

    #[must_use]
    pub fn is_below(&self, limit_ft: u32) -> bool {
        self.feet().is_some_and(|feet| feet < limit_ft)
    }
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ceiling::Feet(feet) => write!(f, "{feet} ft"),
            Ceiling::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Sky cover amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SkyCoverage {
    Few,
    Sct,
    Bkn,
    Ovc,
    Vv,
    Clr,
    Skc,
    Nsc,
    Ncd,
}

impl SkyCoverage {
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FEW" => Some(SkyCoverage::Few),
            "SCT" => Some(SkyCoverage::Sct),
            "BKN" => Some(SkyCoverage::Bkn),
            "OVC" => Some(SkyCoverage::Ovc),
            "VV" => Some(SkyCoverage::Vv),
            "CLR" => Some(SkyCoverage::Clr),
            "SKC" => Some(SkyCoverage::Skc),
            "NSC" => Some(SkyCoverage::Nsc),
            "NCD" => Some(SkyCoverage::Ncd),
            _ => None,
        }
    }

    /// Whether a layer of this amount constitutes a ceiling
    #[must_use]
    pub fn is_ceiling(&self) -> bool {
        matches!(self, SkyCoverage::Bkn | SkyCoverage::Ovc | SkyCoverage::Vv)
    }

    /// Clear-sky groups carry no layer height
    #[must_use]
    pub fn is_clear(&self) -> bool {
        matches!(
            self,
            SkyCoverage::Clr | SkyCoverage::Skc | SkyCoverage::Nsc | SkyCoverage::Ncd
        )
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            SkyCoverage::Few => "few clouds",
            SkyCoverage::Sct => "scattered clouds",
            SkyCoverage::Bkn => "broken clouds",
            SkyCoverage::Ovc => "overcast",
            SkyCoverage::Vv => "vertical visibility",
            SkyCoverage::Clr => "clear",
            SkyCoverage::Skc => "sky clear",
            SkyCoverage::Nsc => "no significant clouds",
            SkyCoverage::Ncd => "no clouds detected",
        }
    }
}

/// Convective cloud suffix on a sky layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConvectiveCloud {
    Cb,
    Tcu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyLayer {
    pub coverage: SkyCoverage,
    /// Layer base in feet above ground
    pub height_ft: Option<u32>,
    pub convective: Option<ConvectiveCloud>,
}

impl SkyLayer {
    #[must_use]
    pub fn describe(&self) -> String {
        let mut text = self.coverage.description().to_string();
        if let Some(height) = self.height_ft {
            text.push_str(&format!(" at {height} ft"));
        }
        match self.convective {
            Some(ConvectiveCloud::Cb) => text.push_str(" (cumulonimbus)"),
            Some(ConvectiveCloud::Tcu) => text.push_str(" (towering cumulus)"),
            None => {}
        }
        text
    }
}

/// Intensity or proximity qualifier of a weather group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    Light,
    Moderate,
    Heavy,
    Vicinity,
}

/// Weather descriptor prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Descriptor {
    Mi,
    Pr,
    Bc,
    Dr,
    Bl,
    Sh,
    Fz,
    Ts,
}

impl Descriptor {
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "MI" => Some(Descriptor::Mi),
            "PR" => Some(Descriptor::Pr),
            "BC" => Some(Descriptor::Bc),
            "DR" => Some(Descriptor::Dr),
            "BL" => Some(Descriptor::Bl),
            "SH" => Some(Descriptor::Sh),
            "FZ" => Some(Descriptor::Fz),
            "TS" => Some(Descriptor::Ts),
            _ => None,
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Descriptor::Mi => "shallow",
            Descriptor::Pr => "partial",
            Descriptor::Bc => "patches of",
            Descriptor::Dr => "low drifting",
            Descriptor::Bl => "blowing",
            Descriptor::Sh => "showers",
            Descriptor::Fz => "freezing",
            Descriptor::Ts => "thunderstorm",
        }
    }
}

/// Two-letter precipitation, obscuration and other phenomenon codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhenomenonCode {
    Ra,
    Dz,
    Sn,
    Sg,
    Ic,
    Pl,
    Gr,
    Gs,
    Up,
    Fg,
    Br,
    Hz,
    Du,
    Sa,
    Fu,
    Va,
    Py,
    Sq,
    Fc,
    Ss,
    Ds,
    Po,
}

impl PhenomenonCode {
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        let phenomenon = match code {
            "RA" => PhenomenonCode::Ra,
            "DZ" => PhenomenonCode::Dz,
            "SN" => PhenomenonCode::Sn,
            "SG" => PhenomenonCode::Sg,
            "IC" => PhenomenonCode::Ic,
            "PL" => PhenomenonCode::Pl,
            "GR" => PhenomenonCode::Gr,
            "GS" => PhenomenonCode::Gs,
            "UP" => PhenomenonCode::Up,
            "FG" => PhenomenonCode::Fg,
            "BR" => PhenomenonCode::Br,
            "HZ" => PhenomenonCode::Hz,
            "DU" => PhenomenonCode::Du,
            "SA" => PhenomenonCode::Sa,
            "FU" => PhenomenonCode::Fu,
            "VA" => PhenomenonCode::Va,
            "PY" => PhenomenonCode::Py,
            "SQ" => PhenomenonCode::Sq,
            "FC" => PhenomenonCode::Fc,
            "SS" => PhenomenonCode::Ss,
            "DS" => PhenomenonCode::Ds,
            "PO" => PhenomenonCode::Po,
            _ => return None,
        };
        Some(phenomenon)
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            PhenomenonCode::Ra => "rain",
            PhenomenonCode::Dz => "drizzle",
            PhenomenonCode::Sn => "snow",
            PhenomenonCode::Sg => "snow grains",
            PhenomenonCode::Ic => "ice crystals",
            PhenomenonCode::Pl => "ice pellets",
            PhenomenonCode::Gr => "hail",
            PhenomenonCode::Gs => "small hail",
            PhenomenonCode::Up => "unknown precipitation",
            PhenomenonCode::Fg => "fog",
            PhenomenonCode::Br => "mist",
            PhenomenonCode::Hz => "haze",
            PhenomenonCode::Du => "dust",
            PhenomenonCode::Sa => "sand",
            PhenomenonCode::Fu => "smoke",
            PhenomenonCode::Va => "volcanic ash",
            PhenomenonCode::Py => "spray",
            PhenomenonCode::Sq => "squalls",
            PhenomenonCode::Fc => "funnel cloud",
            PhenomenonCode::Ss => "sandstorm",
            PhenomenonCode::Ds => "duststorm",
            PhenomenonCode::Po => "dust whirls",
        }
    }

    #[must_use]
    pub fn is_precipitation(&self) -> bool {
        matches!(
            self,
            PhenomenonCode::Ra
                | PhenomenonCode::Dz
                | PhenomenonCode::Sn
                | PhenomenonCode::Sg
                | PhenomenonCode::Ic
                | PhenomenonCode::Pl
                | PhenomenonCode::Gr
                | PhenomenonCode::Gs
                | PhenomenonCode::Up
        )
    }
}

/// One present-weather group such as `-SHRA` or `+TSRAGR`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPhenomenon {
    pub raw: String,
    pub intensity: Intensity,
    pub descriptor: Option<Descriptor>,
    pub codes: Vec<PhenomenonCode>,
}

impl WeatherPhenomenon {
    #[must_use]
    pub fn is_thunderstorm(&self) -> bool {
        self.descriptor == Some(Descriptor::Ts)
    }

    #[must_use]
    pub fn is_freezing(&self) -> bool {
        self.descriptor == Some(Descriptor::Fz)
    }

    #[must_use]
    pub fn is_fog(&self) -> bool {
        self.codes.contains(&PhenomenonCode::Fg)
    }

    #[must_use]
    pub fn is_mist(&self) -> bool {
        self.codes.contains(&PhenomenonCode::Br)
    }

    #[must_use]
    pub fn is_snow(&self) -> bool {
        self.codes
            .iter()
            .any(|code| matches!(code, PhenomenonCode::Sn | PhenomenonCode::Sg))
    }

    #[must_use]
    pub fn is_precipitation(&self) -> bool {
        self.codes.iter().any(PhenomenonCode::is_precipitation)
    }

    #[must_use]
    pub fn is_heavy_precipitation(&self) -> bool {
        self.intensity == Intensity::Heavy && self.is_precipitation()
    }

    /// English wording, e.g. "heavy thunderstorm rain"
    #[must_use]
    pub fn description(&self) -> String {
        let mut words: Vec<&str> = Vec::new();
        match self.intensity {
            Intensity::Light => words.push("light"),
            Intensity::Heavy => words.push("heavy"),
            Intensity::Moderate | Intensity::Vicinity => {}
        }
        let showers = self.descriptor == Some(Descriptor::Sh);
        if let Some(descriptor) = self.descriptor.filter(|_| !showers) {
            words.push(descriptor.description());
        }
        let codes = self
            .codes
            .iter()
            .map(PhenomenonCode::description)
            .collect::<Vec<_>>()
            .join(" and ");
        if !codes.is_empty() {
            words.push(&codes);
        }
        // "rain showers" rather than "showers rain"
        if showers {
            words.push(Descriptor::Sh.description());
        }
        let mut text = words.join(" ");
        if self.intensity == Intensity::Vicinity {
            text.push_str(" in vicinity");
        }
        text
    }
}

/// Partial observation: every field optional.
///
/// A METAR fills whatever groups it reported; a TAF change group carries only the
/// groups it states explicitly. Composition never mutates either side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationFields {
    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    pub ceiling: Option<Ceiling>,
    pub sky_layers: Option<Vec<SkyLayer>>,
    pub weather: Option<Vec<WeatherPhenomenon>>,
    pub temperature_c: Option<i32>,
    pub dewpoint_c: Option<i32>,
    pub altimeter_inhg: Option<f64>,
}

impl ObservationFields {
    /// Fields of `overrides` win; unset ones are taken from `self`
    #[must_use]
    pub fn overlay(&self, overrides: &ObservationFields) -> ObservationFields {
        ObservationFields {
            wind: overrides.wind.clone().or_else(|| self.wind.clone()),
            visibility: overrides.visibility.or(self.visibility),
            ceiling: overrides.ceiling.or(self.ceiling),
            sky_layers: overrides
                .sky_layers
                .clone()
                .or_else(|| self.sky_layers.clone()),
            weather: overrides.weather.clone().or_else(|| self.weather.clone()),
            temperature_c: overrides.temperature_c.or(self.temperature_c),
            dewpoint_c: overrides.dewpoint_c.or(self.dewpoint_c),
            altimeter_inhg: overrides.altimeter_inhg.or(self.altimeter_inhg),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == ObservationFields::default()
    }

    #[must_use]
    pub fn flight_category(&self) -> FlightCategory {
        classify(self.visibility, self.ceiling)
    }

    #[must_use]
    pub fn weather_groups(&self) -> &[WeatherPhenomenon] {
        self.weather.as_deref().unwrap_or(&[])
    }

    #[must_use]
    pub fn layers(&self) -> &[SkyLayer] {
        self.sky_layers.as_deref().unwrap_or(&[])
    }

    /// TS weather or a cumulonimbus layer
    #[must_use]
    pub fn has_thunderstorm(&self) -> bool {
        self.weather_groups()
            .iter()
            .any(WeatherPhenomenon::is_thunderstorm)
            || self
                .layers()
                .iter()
                .any(|layer| layer.convective == Some(ConvectiveCloud::Cb))
    }
}

/// Decoded METAR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedObservation {
    pub station: String,
    /// Observation time resolved to a full timestamp
    pub reference_time: DateTime<Utc>,
    /// `AUTO` or `COR` modifier when present
    pub modifier: Option<String>,
    #[serde(flatten)]
    pub fields: ObservationFields,
    pub flight_category: FlightCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rain(intensity: Intensity) -> WeatherPhenomenon {
        WeatherPhenomenon {
            raw: "RA".to_string(),
            intensity,
            descriptor: None,
            codes: vec![PhenomenonCode::Ra],
        }
    }

    #[test]
    fn test_overlay_keeps_unset_fields() {
        let base = ObservationFields {
            wind: Some(Wind {
                direction: WindDirection::Degrees(270),
                speed_kt: 10,
                gust_kt: None,
                variable_range: None,
            }),
            visibility: Some(Visibility::Unlimited),
            ceiling: Some(Ceiling::Feet(5000)),
            ..ObservationFields::default()
        };
        let tempo = ObservationFields {
            visibility: Some(Visibility::StatuteMiles(2.0)),
            weather: Some(vec![rain(Intensity::Heavy)]),
            ..ObservationFields::default()
        };

        let merged = base.overlay(&tempo);
        assert_eq!(merged.visibility, Some(Visibility::StatuteMiles(2.0)));
        assert_eq!(merged.ceiling, Some(Ceiling::Feet(5000)));
        assert_eq!(merged.wind, base.wind);
        assert_eq!(merged.weather_groups().len(), 1);
        // inputs untouched
        assert_eq!(base.visibility, Some(Visibility::Unlimited));
        assert!(base.weather.is_none());
    }

    #[test]
    fn test_empty_weather_override_clears() {
        let base = ObservationFields {
            weather: Some(vec![rain(Intensity::Light)]),
            ..ObservationFields::default()
        };
        let nsw = ObservationFields {
            weather: Some(Vec::new()),
            ..ObservationFields::default()
        };
        assert!(base.overlay(&nsw).weather_groups().is_empty());
    }

    #[test]
    fn test_phenomenon_description() {
        let storm = WeatherPhenomenon {
            raw: "+TSRA".to_string(),
            intensity: Intensity::Heavy,
            descriptor: Some(Descriptor::Ts),
            codes: vec![PhenomenonCode::Ra],
        };
        assert_eq!(storm.description(), "heavy thunderstorm rain");
        assert!(storm.is_thunderstorm());
        assert!(storm.is_heavy_precipitation());

        let vicinity = WeatherPhenomenon {
            raw: "VCSH".to_string(),
            intensity: Intensity::Vicinity,
            descriptor: Some(Descriptor::Sh),
            codes: Vec::new(),
        };
        assert_eq!(vicinity.description(), "showers in vicinity");
    }

    #[test]
    fn test_cb_layer_counts_as_thunderstorm() {
        let fields = ObservationFields {
            sky_layers: Some(vec![SkyLayer {
                coverage: SkyCoverage::Bkn,
                height_ft: Some(3000),
                convective: Some(ConvectiveCloud::Cb),
            }]),
            ..ObservationFields::default()
        };
        assert!(fields.has_thunderstorm());
        assert_eq!(fields.layers()[0].describe(), "broken clouds at 3000 ft (cumulonimbus)");
    }

    #[test]
    fn test_visibility_thresholds() {
        assert!(Visibility::StatuteMiles(0.5).is_below(1.0));
        assert!(!Visibility::Unlimited.is_below(1.0));
        assert!(Ceiling::Feet(300).is_below(500));
        assert!(!Ceiling::Unlimited.is_below(500));
        assert_eq!(Visibility::StatuteMiles(10.0).to_string(), "10 SM");
    }
}
