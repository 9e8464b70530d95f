//! Flight category classification from visibility and ceiling

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{BriefingCategory, Ceiling, Visibility};

/// Standard flight rules category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    Vfr,
    Mvfr,
    Ifr,
    Lifr,
    Unknown,
}

impl FlightCategory {
    /// 0 (VFR) to 3 (LIFR), `None` for UNKNOWN
    #[must_use]
    pub fn rank(&self) -> Option<u8> {
        match self {
            FlightCategory::Vfr => Some(0),
            FlightCategory::Mvfr => Some(1),
            FlightCategory::Ifr => Some(2),
            FlightCategory::Lifr => Some(3),
            FlightCategory::Unknown => None,
        }
    }

    /// The more restrictive of two known categories
    #[must_use]
    pub fn worse(self, other: FlightCategory) -> FlightCategory {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) if b > a => other,
            (Some(_), _) => self,
            (None, _) => other,
        }
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightCategory::Vfr => write!(f, "VFR"),
            FlightCategory::Mvfr => write!(f, "MVFR"),
            FlightCategory::Ifr => write!(f, "IFR"),
            FlightCategory::Lifr => write!(f, "LIFR"),
            FlightCategory::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl From<FlightCategory> for BriefingCategory {
    fn from(category: FlightCategory) -> Self {
        match category {
            FlightCategory::Vfr => BriefingCategory::Clear,
            FlightCategory::Mvfr => BriefingCategory::Significant,
            FlightCategory::Ifr | FlightCategory::Lifr => BriefingCategory::Severe,
            FlightCategory::Unknown => BriefingCategory::Unknown,
        }
    }
}

fn visibility_tier(visibility: Visibility) -> FlightCategory {
    match visibility {
        Visibility::Unlimited => FlightCategory::Vfr,
        Visibility::StatuteMiles(miles) if miles > 5.0 => FlightCategory::Vfr,
        Visibility::StatuteMiles(miles) if miles >= 3.0 => FlightCategory::Mvfr,
        Visibility::StatuteMiles(miles) if miles >= 1.0 => FlightCategory::Ifr,
        Visibility::StatuteMiles(_) => FlightCategory::Lifr,
    }
}

fn ceiling_tier(ceiling: Ceiling) -> FlightCategory {
    match ceiling {
        Ceiling::Unlimited => FlightCategory::Vfr,
        Ceiling::Feet(feet) if feet > 3000 => FlightCategory::Vfr,
        Ceiling::Feet(feet) if feet >= 1000 => FlightCategory::Mvfr,
        Ceiling::Feet(feet) if feet >= 500 => FlightCategory::Ifr,
        Ceiling::Feet(_) => FlightCategory::Lifr,
    }
}

/// Classify conditions into a flight category.
///
/// Each reported input implies a tier and the worse tier wins. UNKNOWN is only
/// returned when neither visibility nor ceiling was reported.
#[must_use]
pub fn classify(visibility: Option<Visibility>, ceiling: Option<Ceiling>) -> FlightCategory {
    match (visibility.map(visibility_tier), ceiling.map(ceiling_tier)) {
        (Some(vis), Some(ceil)) => vis.worse(ceil),
        (Some(tier), None) | (None, Some(tier)) => tier,
        (None, None) => FlightCategory::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(8.0, 5000, FlightCategory::Vfr, BriefingCategory::Clear)]
    #[case(4.0, 2000, FlightCategory::Mvfr, BriefingCategory::Significant)]
    #[case(0.5, 300, FlightCategory::Lifr, BriefingCategory::Severe)]
    #[case(2.0, 5000, FlightCategory::Ifr, BriefingCategory::Severe)]
    #[case(10.0, 800, FlightCategory::Ifr, BriefingCategory::Severe)]
    #[case(5.0, 3000, FlightCategory::Mvfr, BriefingCategory::Significant)]
    #[case(6.0, 3100, FlightCategory::Vfr, BriefingCategory::Clear)]
    #[case(1.0, 500, FlightCategory::Ifr, BriefingCategory::Severe)]
    fn test_classify_examples(
        #[case] visibility_sm: f64,
        #[case] ceiling_ft: u32,
        #[case] expected: FlightCategory,
        #[case] briefing: BriefingCategory,
    ) {
        let category = classify(
            Some(Visibility::StatuteMiles(visibility_sm)),
            Some(Ceiling::Feet(ceiling_ft)),
        );
        assert_eq!(category, expected);
        assert_eq!(BriefingCategory::from(category), briefing);
    }

    #[test]
    fn test_unknown_only_when_both_absent() {
        assert_eq!(classify(None, None), FlightCategory::Unknown);
        assert_eq!(
            classify(Some(Visibility::StatuteMiles(2.0)), None),
            FlightCategory::Ifr
        );
        assert_eq!(classify(None, Some(Ceiling::Feet(400))), FlightCategory::Lifr);
        assert_eq!(
            classify(Some(Visibility::Unlimited), Some(Ceiling::Unlimited)),
            FlightCategory::Vfr
        );
        assert_eq!(
            BriefingCategory::from(FlightCategory::Unknown),
            BriefingCategory::Unknown
        );
    }

    #[test]
    fn test_classify_is_monotonic() {
        let visibilities = [0.25, 0.5, 0.99, 1.0, 2.0, 2.99, 3.0, 4.0, 5.0, 5.01, 7.0, 10.0];
        let ceilings = [100, 400, 499, 500, 800, 999, 1000, 2000, 3000, 3001, 5000, 12000];

        for (i, &vis_a) in visibilities.iter().enumerate() {
            for &vis_b in &visibilities[i..] {
                for (j, &ceil_a) in ceilings.iter().enumerate() {
                    for &ceil_b in &ceilings[j..] {
                        let worse = classify(
                            Some(Visibility::StatuteMiles(vis_a)),
                            Some(Ceiling::Feet(ceil_a)),
                        );
                        let better = classify(
                            Some(Visibility::StatuteMiles(vis_b)),
                            Some(Ceiling::Feet(ceil_b)),
                        );
                        assert!(
                            better.rank() <= worse.rank(),
                            "({vis_b}, {ceil_b}) classified worse than ({vis_a}, {ceil_a})"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_worse_ignores_unknown() {
        assert_eq!(FlightCategory::Vfr.worse(FlightCategory::Ifr), FlightCategory::Ifr);
        assert_eq!(FlightCategory::Lifr.worse(FlightCategory::Mvfr), FlightCategory::Lifr);
        assert_eq!(FlightCategory::Unknown.worse(FlightCategory::Vfr), FlightCategory::Vfr);
        assert_eq!(FlightCategory::Mvfr.worse(FlightCategory::Unknown), FlightCategory::Mvfr);
    }
}
