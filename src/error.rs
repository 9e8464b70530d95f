//! Error types and handling for the `SkyBrief` briefing engine

use thiserror::Error;

/// Main error type for the `SkyBrief` briefing engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkyBriefError {
    /// A mandatory group of a single report is missing or malformed
    #[error("Parse error: {reason} (report: {raw_text})")]
    Parse { reason: String, raw_text: String },

    /// An airport code is not present in the coordinate table
    #[error("Airport not found: {code}")]
    AirportNotFound { code: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl SkyBriefError {
    /// Create a new parse error for one raw report
    pub fn parse<R: Into<String>, T: Into<String>>(reason: R, raw_text: T) -> Self {
        Self::Parse {
            reason: reason.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Create a new airport lookup error
    pub fn airport_not_found<S: Into<String>>(code: S) -> Self {
        Self::AirportNotFound { code: code.into() }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the pipeline can continue after this error
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SkyBriefError::Parse { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SkyBriefError::Parse { reason, .. } => {
                format!("Report unavailable: {reason}")
            }
            SkyBriefError::AirportNotFound { code } => {
                format!("Unknown airport code {code}. Please use a supported 4-letter ICAO code.")
            }
            SkyBriefError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            SkyBriefError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let parse_err = SkyBriefError::parse("missing station", "123456Z");
        assert!(matches!(parse_err, SkyBriefError::Parse { .. }));

        let lookup_err = SkyBriefError::airport_not_found("ZZZZ");
        assert!(matches!(
            lookup_err,
            SkyBriefError::AirportNotFound { ref code } if code == "ZZZZ"
        ));

        let validation_err = SkyBriefError::validation("route too short");
        assert!(matches!(validation_err, SkyBriefError::Validation { .. }));
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(SkyBriefError::parse("bad wind", "KJFK").is_recoverable());
        assert!(!SkyBriefError::airport_not_found("ZZZZ").is_recoverable());
        assert!(!SkyBriefError::config("bad").is_recoverable());
    }

    #[test]
    fn test_user_messages() {
        let lookup_err = SkyBriefError::airport_not_found("ZZZZ");
        assert!(lookup_err.user_message().contains("ZZZZ"));

        let config_err = SkyBriefError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let parse_err = SkyBriefError::parse("missing validity window", "TAF KJFK");
        assert!(parse_err.user_message().contains("missing validity window"));
        assert!(parse_err.to_string().contains("TAF KJFK"));
    }
}
