//! Airport model with geographic coordinates

use serde::{Deserialize, Serialize};

/// Airport reference point
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Airport {
    /// ICAO code
    pub code: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// City or airport name
    pub name: String,
}

impl Airport {
    /// Create a new airport
    #[must_use]
    pub fn new(code: &str, latitude: f64, longitude: f64, name: &str) -> Self {
        Self {
            code: code.to_uppercase(),
            latitude,
            longitude,
            name: name.to_string(),
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Geographic point used for the route center
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airport_creation() {
        let airport = Airport::new("kjfk", 40.6413, -73.7781, "New York JFK");
        assert_eq!(airport.code, "KJFK");
        assert_eq!(airport.format_coordinates(), "40.6413, -73.7781");
    }
}
