//! Airport coordinates and great-circle distances
//!
//! Distances use the haversine formula and are reported in nautical miles.

use std::collections::HashMap;
use tracing::debug;

use crate::models::{Airport, GeoPoint, RouteLeg};
use crate::{Result, SkyBriefError};

const KM_PER_NM: f64 = 1.852;

/// Geographic center of the contiguous United States, used for an empty route
const DEFAULT_CENTER: GeoPoint = GeoPoint {
    latitude: 39.8283,
    longitude: -98.5795,
};

const BUILTIN_AIRPORTS: &[(&str, f64, f64, &str)] = &[
    // North America
    ("KJFK", 40.6413, -73.7781, "New York JFK"),
    ("KLAX", 34.0522, -118.2437, "Los Angeles"),
    ("KORD", 41.9742, -87.9073, "Chicago O'Hare"),
    ("KDEN", 39.8561, -104.6737, "Denver"),
    ("KATL", 33.6407, -84.4277, "Atlanta"),
    ("KDFW", 32.8998, -97.0403, "Dallas/Fort Worth"),
    ("KPHX", 33.4484, -112.0740, "Phoenix"),
    ("KLAS", 36.0840, -115.1537, "Las Vegas"),
    ("KSEA", 47.4502, -122.3088, "Seattle-Tacoma"),
    ("KBOS", 42.3656, -71.0096, "Boston Logan"),
    ("KMIA", 25.7959, -80.2870, "Miami"),
    ("KIAH", 29.9902, -95.3368, "Houston Intercontinental"),
    // Europe
    ("EGLL", 51.4700, -0.4543, "London Heathrow"),
    ("LFPG", 49.0097, 2.5479, "Paris Charles de Gaulle"),
    ("EDDF", 50.0379, 8.5622, "Frankfurt"),
    ("EHAM", 52.3105, 4.7683, "Amsterdam Schiphol"),
    ("LEMD", 40.4839, -3.5680, "Madrid Barajas"),
    ("LIRF", 41.8003, 12.2389, "Rome Fiumicino"),
    ("LOWW", 48.1103, 16.5697, "Vienna"),
    ("ESSA", 59.6519, 17.9186, "Stockholm Arlanda"),
    ("EKCH", 55.6181, 12.6561, "Copenhagen"),
    ("EDDM", 48.3537, 11.7750, "Munich"),
    // Asia Pacific
    ("VABB", 19.0896, 72.8656, "Mumbai"),
    ("VIDP", 28.5562, 77.1000, "Delhi"),
    ("VOMM", 13.0827, 80.2707, "Chennai"),
    ("VOBL", 12.9716, 77.5946, "Bengaluru"),
    ("RJTT", 35.7647, 140.3864, "Tokyo Haneda"),
    ("RJAA", 35.7720, 140.3928, "Tokyo Narita"),
    ("RKSI", 37.4602, 126.4407, "Seoul Incheon"),
    ("VHHH", 22.3080, 113.9185, "Hong Kong"),
    ("WSSS", 1.3644, 103.9915, "Singapore Changi"),
    ("WIII", 6.1256, 106.6559, "Jakarta"),
    ("YBBN", -27.3942, 153.1218, "Brisbane"),
    ("YSSY", -33.9399, 151.1753, "Sydney"),
    ("YMML", -37.6690, 144.8410, "Melbourne"),
    // Middle East
    ("OMDB", 25.2532, 55.3657, "Dubai"),
    ("OERK", 24.9576, 46.6988, "Riyadh"),
    ("OTHH", 25.2731, 51.6080, "Doha Hamad"),
    ("OJAI", 29.9864, 47.9681, "Kuwait"),
    ("LTBA", 40.9769, 28.8146, "Istanbul Ataturk"),
    // Africa
    ("HECA", 30.1127, 31.4000, "Cairo"),
    ("FACT", -33.9648, 18.6017, "Cape Town"),
    ("FAOR", -26.1367, 28.2411, "Johannesburg"),
    ("FALA", -8.8583, 13.2312, "Luanda"),
    // South America
    ("SBGR", -23.4356, -46.4731, "Sao Paulo Guarulhos"),
    ("SCEL", -33.3930, -70.7858, "Santiago"),
    ("SAEZ", -34.8222, -58.5358, "Buenos Aires Ezeiza"),
    ("SKBO", 4.7016, -74.1469, "Bogota"),
];

/// Coordinate lookup table keyed by ICAO code
#[derive(Debug, Clone)]
pub struct AirportDirectory {
    airports: HashMap<String, Airport>,
}

impl Default for AirportDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AirportDirectory {
    /// Directory without any airports
    #[must_use]
    pub fn empty() -> Self {
        Self {
            airports: HashMap::new(),
        }
    }

    /// Directory pre-filled with the major airports table
    #[must_use]
    pub fn builtin() -> Self {
        let mut directory = Self::empty();
        for (code, latitude, longitude, name) in BUILTIN_AIRPORTS {
            directory.insert(Airport::new(code, *latitude, *longitude, name));
        }
        directory
    }

    /// Add or replace an airport
    pub fn insert(&mut self, airport: Airport) {
        self.airports.insert(airport.code.clone(), airport);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.airports.contains_key(&code.trim().to_uppercase())
    }

    pub fn lookup(&self, code: &str) -> Result<&Airport> {
        let code = code.trim().to_uppercase();
        self.airports
            .get(&code)
            .ok_or_else(|| SkyBriefError::airport_not_found(code))
    }

    /// Great-circle distance in nautical miles
    pub fn distance_nm(&self, from: &str, to: &str) -> Result<f64> {
        let a = self.lookup(from)?;
        let b = self.lookup(to)?;
        // same operand order either way round so the result is exactly symmetric
        let (first, second) = if a.code <= b.code { (a, b) } else { (b, a) };
        let km = haversine::distance(
            haversine::Location {
                latitude: first.latitude,
                longitude: first.longitude,
            },
            haversine::Location {
                latitude: second.latitude,
                longitude: second.longitude,
            },
            haversine::Units::Kilometers,
        );
        Ok(km / KM_PER_NM)
    }

    /// Consecutive legs of a route
    pub fn route_legs(&self, route: &[String]) -> Result<Vec<RouteLeg>> {
        route
            .windows(2)
            .map(|pair| {
                Ok(RouteLeg {
                    from: pair[0].to_uppercase(),
                    to: pair[1].to_uppercase(),
                    distance_nm: self.distance_nm(&pair[0], &pair[1])?,
                })
            })
            .collect()
    }

    /// Sum of all leg distances
    pub fn route_distance_nm(&self, route: &[String]) -> Result<f64> {
        let total = self
            .route_legs(route)?
            .iter()
            .map(|leg| leg.distance_nm)
            .sum();
        debug!(airports = route.len(), total_nm = total, "Computed route distance");
        Ok(total)
    }

    /// Mean coordinates of the route airports
    pub fn route_center(&self, route: &[String]) -> Result<GeoPoint> {
        if route.is_empty() {
            return Ok(DEFAULT_CENTER);
        }
        let airports = route
            .iter()
            .map(|code| self.lookup(code))
            .collect::<Result<Vec<_>>>()?;
        let count = airports.len() as f64;
        Ok(GeoPoint {
            latitude: airports.iter().map(|a| a.latitude).sum::<f64>() / count,
            longitude: airports.iter().map(|a| a.longitude).sum::<f64>() / count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn route(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|code| (*code).to_string()).collect()
    }

    #[test]
    fn test_mumbai_to_paris() {
        let directory = AirportDirectory::builtin();
        let distance = directory.distance_nm("VABB", "LFPG").unwrap();
        assert!((distance - 3776.2).abs() < 0.5, "got {distance}");
    }

    #[rstest]
    #[case("KJFK", "KLAX")]
    #[case("EGLL", "YSSY")]
    #[case("SCEL", "RJTT")]
    fn test_distance_is_symmetric(#[case] a: &str, #[case] b: &str) {
        let directory = AirportDirectory::builtin();
        assert_eq!(
            directory.distance_nm(a, b).unwrap(),
            directory.distance_nm(b, a).unwrap()
        );
    }

    #[test]
    fn test_unknown_airport() {
        let directory = AirportDirectory::builtin();
        let err = directory.distance_nm("KJFK", "ZZZZ").unwrap_err();
        assert_eq!(err, SkyBriefError::airport_not_found("ZZZZ"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let directory = AirportDirectory::builtin();
        assert_eq!(directory.lookup("kjfk").unwrap().code, "KJFK");
        assert!(directory.contains(" egll "));
    }

    #[test]
    fn test_route_legs_and_total() {
        let directory = AirportDirectory::builtin();
        let route = route(&["KJFK", "KORD", "KDEN"]);
        let legs = directory.route_legs(&route).unwrap();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[1].from, "KORD");
        let total = directory.route_distance_nm(&route).unwrap();
        assert!((total - legs.iter().map(|l| l.distance_nm).sum::<f64>()).abs() < 1e-9);
        assert_eq!(directory.route_distance_nm(&route[..1]).unwrap(), 0.0);
    }

    #[test]
    fn test_route_center() {
        let directory = AirportDirectory::builtin();
        let center = directory.route_center(&route(&["KJFK", "KLAX"])).unwrap();
        assert!((center.latitude - (40.6413 + 34.0522) / 2.0).abs() < 1e-9);
        assert_eq!(directory.route_center(&[]).unwrap(), DEFAULT_CENTER);
    }

    #[test]
    fn test_custom_airport() {
        let mut directory = AirportDirectory::empty();
        assert!(directory.is_empty());
        directory.insert(Airport::new("ksfo", 37.6213, -122.3790, "San Francisco"));
        assert_eq!(directory.len(), 1);
        assert!(directory.lookup("KSFO").is_ok());
    }
}
