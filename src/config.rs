//! Configuration management for the `SkyBrief` briefing engine
//!
//! Handles loading configuration from files and environment variables,
//! and provides validation for all configuration settings. The hazard
//! thresholds default to the values the briefing rules were tuned with.

use crate::SkyBriefError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `SkyBrief` engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkyBriefConfig {
    /// Hazard detection thresholds
    #[serde(default)]
    pub hazards: HazardThresholds,
    /// Briefing text limits
    #[serde(default)]
    pub briefing: BriefingLimits,
    /// Timeline sampling settings
    #[serde(default)]
    pub timeline: TimelineConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Thresholds used by the hazard detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardThresholds {
    /// Wind (sustained or gust) reported as a key factor, knots
    #[serde(default = "default_wind_moderate")]
    pub wind_moderate_kt: u32,
    /// Wind raising a moderate strong-wind hazard, knots
    #[serde(default = "default_wind_strong")]
    pub wind_strong_kt: u32,
    /// Wind raising a high strong-wind hazard, knots
    #[serde(default = "default_wind_severe")]
    pub wind_severe_kt: u32,
    /// Minimum PIREP intensity (0 NEG .. 5 EXTRM) counted as a hazard
    #[serde(default = "default_pirep_min_intensity")]
    pub pirep_min_intensity: u8,
    /// PIREPs older than this are ignored
    #[serde(default = "default_pirep_max_age")]
    pub pirep_max_age_hours: f64,
    /// Visibility below this is a low-visibility hazard, statute miles
    #[serde(default = "default_lifr_visibility")]
    pub lifr_visibility_sm: f64,
    /// Ceiling below this is a low-ceiling hazard, feet
    #[serde(default = "default_lifr_ceiling")]
    pub lifr_ceiling_ft: u32,
}

/// Limits applied to generated briefing text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingLimits {
    /// Maximum number of decision factors
    #[serde(default = "default_max_decision_factors")]
    pub max_decision_factors: usize,
    /// Maximum number of pilot recommendations
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,
}

/// Timeline sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Analysis horizon in hours
    #[serde(default = "default_horizon_hours")]
    pub horizon_hours: u32,
    /// Sampling interval in minutes
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u32,
    /// Cruise ground speed used to place samples along the route, knots
    #[serde(default = "default_cruise_speed")]
    pub cruise_speed_kt: f64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_wind_moderate() -> u32 {
    15
}

fn default_wind_strong() -> u32 {
    25
}

fn default_wind_severe() -> u32 {
    35
}

fn default_pirep_min_intensity() -> u8 {
    3
}

fn default_pirep_max_age() -> f64 {
    3.0
}

fn default_lifr_visibility() -> f64 {
    1.0
}

fn default_lifr_ceiling() -> u32 {
    500
}

fn default_max_decision_factors() -> usize {
    5
}

fn default_max_recommendations() -> usize {
    8
}

fn default_horizon_hours() -> u32 {
    24
}

fn default_interval_minutes() -> u32 {
    60
}

fn default_cruise_speed() -> f64 {
    450.0
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for HazardThresholds {
    fn default() -> Self {
        Self {
            wind_moderate_kt: default_wind_moderate(),
            wind_strong_kt: default_wind_strong(),
            wind_severe_kt: default_wind_severe(),
            pirep_min_intensity: default_pirep_min_intensity(),
            pirep_max_age_hours: default_pirep_max_age(),
            lifr_visibility_sm: default_lifr_visibility(),
            lifr_ceiling_ft: default_lifr_ceiling(),
        }
    }
}

impl Default for BriefingLimits {
    fn default() -> Self {
        Self {
            max_decision_factors: default_max_decision_factors(),
            max_recommendations: default_max_recommendations(),
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            horizon_hours: default_horizon_hours(),
            interval_minutes: default_interval_minutes(),
            cruise_speed_kt: default_cruise_speed(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for SkyBriefConfig {
    fn default() -> Self {
        Self {
            hazards: HazardThresholds::default(),
            briefing: BriefingLimits::default(),
            timeline: TimelineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SkyBriefConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("skybrief.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SKYBRIEF__HAZARDS__WIND_STRONG_KT=30 style overrides
        builder = builder.add_source(
            Environment::with_prefix("SKYBRIEF")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: SkyBriefConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skybrief").join("config.toml"))
    }

    /// Apply default values to zeroed or empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.hazards.wind_strong_kt == 0 {
            self.hazards.wind_strong_kt = default_wind_strong();
        }
        if self.hazards.wind_severe_kt == 0 {
            self.hazards.wind_severe_kt = default_wind_severe();
        }
        if self.hazards.pirep_max_age_hours <= 0.0 {
            self.hazards.pirep_max_age_hours = default_pirep_max_age();
        }
        if self.briefing.max_decision_factors == 0 {
            self.briefing.max_decision_factors = default_max_decision_factors();
        }
        if self.briefing.max_recommendations == 0 {
            self.briefing.max_recommendations = default_max_recommendations();
        }
        if self.timeline.horizon_hours == 0 {
            self.timeline.horizon_hours = default_horizon_hours();
        }
        if self.timeline.interval_minutes == 0 {
            self.timeline.interval_minutes = default_interval_minutes();
        }
        if self.timeline.cruise_speed_kt <= 0.0 {
            self.timeline.cruise_speed_kt = default_cruise_speed();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_hazard_thresholds()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate that the wind and intensity thresholds are ordered
    fn validate_hazard_thresholds(&self) -> Result<()> {
        let hazards = &self.hazards;
        if hazards.wind_moderate_kt > hazards.wind_strong_kt
            || hazards.wind_strong_kt > hazards.wind_severe_kt
        {
            return Err(SkyBriefError::config(
                "Wind thresholds must satisfy moderate <= strong <= severe",
            )
            .into());
        }

        if hazards.pirep_min_intensity > 5 {
            return Err(SkyBriefError::config(
                "PIREP minimum intensity must be between 0 (NEG) and 5 (EXTRM)",
            )
            .into());
        }

        if hazards.lifr_visibility_sm <= 0.0 || hazards.lifr_visibility_sm > 10.0 {
            return Err(SkyBriefError::config(
                "Low visibility threshold must be between 0 and 10 statute miles",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.timeline.horizon_hours > 120 {
            return Err(SkyBriefError::config("Timeline horizon cannot exceed 120 hours").into());
        }

        if self.timeline.interval_minutes < 5 || self.timeline.interval_minutes > 360 {
            return Err(SkyBriefError::config(
                "Timeline interval must be between 5 and 360 minutes",
            )
            .into());
        }

        if self.timeline.cruise_speed_kt > 1000.0 {
            return Err(SkyBriefError::config("Cruise speed cannot exceed 1000 knots").into());
        }

        if self.hazards.pirep_max_age_hours > 24.0 {
            return Err(SkyBriefError::config("PIREP max age cannot exceed 24 hours").into());
        }

        if self.briefing.max_decision_factors > 20 || self.briefing.max_recommendations > 20 {
            return Err(SkyBriefError::config(
                "Briefing limits cannot exceed 20 entries",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SkyBriefError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SkyBriefError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
