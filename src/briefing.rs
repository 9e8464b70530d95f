//! Route-level briefing synthesis
//!
//! Reduces the per-airport assessments into one route briefing: the worst
//! category, a risk level from a fixed table, an executive summary and pilot
//! recommendations from fixed templates, and the top decision factors.
//! Everything here is a pure function of the assessments and the route.

use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

use crate::config::BriefingLimits;
use crate::models::{
    AirportAssessment, BriefingCategory, Hazard, HazardKind, HazardLevel, RiskLevel, RouteBriefing,
};

/// Route the assessments belong to, departure first
#[derive(Debug, Clone, PartialEq)]
pub struct RouteContext {
    pub route: Vec<String>,
}

impl RouteContext {
    #[must_use]
    pub fn new(route: &[String]) -> Self {
        Self {
            route: route.to_vec(),
        }
    }

    /// `KJFK to KLAX via 1 waypoint(s)`
    #[must_use]
    pub fn label(&self) -> String {
        match self.route.as_slice() {
            [] => "(empty route)".to_string(),
            [only] => only.clone(),
            [first, .., last] => {
                let mut label = format!("{first} to {last}");
                if self.route.len() > 2 {
                    label.push_str(&format!(" via {} waypoint(s)", self.route.len() - 2));
                }
                label
            }
        }
    }
}

/// Worst known category; UNKNOWN only when nothing is known
fn overall_category(assessments: &[AirportAssessment]) -> BriefingCategory {
    assessments
        .iter()
        .map(|assessment| assessment.category)
        .filter_map(|category| category.rank().map(|rank| (rank, category)))
        .max_by_key(|(rank, _)| *rank)
        .map_or(BriefingCategory::Unknown, |(_, category)| category)
}

fn risk_level(category: BriefingCategory, hazard_count: usize, high_count: usize) -> RiskLevel {
    match (category, hazard_count, high_count) {
        (BriefingCategory::Severe, _, _) | (_, _, 2..) => RiskLevel::High,
        (BriefingCategory::Unknown, _, _) => RiskLevel::Moderate,
        (BriefingCategory::Significant, 1.., _) => RiskLevel::Moderate,
        (BriefingCategory::Clear, 0, _) => RiskLevel::Minimal,
        _ => RiskLevel::Low,
    }
}

/// Codes of the matching airports in route order, each listed once
fn airports_where<'a>(
    assessments: &'a [AirportAssessment],
    predicate: impl Fn(&AirportAssessment) -> bool,
) -> Vec<&'a str> {
    let mut airports: Vec<&'a str> = Vec::new();
    for assessment in assessments.iter().filter(|a| predicate(*a)) {
        if !airports.contains(&assessment.airport.as_str()) {
            airports.push(&assessment.airport);
        }
    }
    airports
}

/// Hazard kind reported at the most airports; ties go to the more severe kind
fn dominant_hazard(assessments: &[AirportAssessment]) -> Option<(HazardKind, usize)> {
    let mut counts: BTreeMap<HazardKind, usize> = BTreeMap::new();
    for assessment in assessments {
        let kinds: HashSet<HazardKind> = assessment.hazards.iter().map(|h| h.kind).collect();
        for kind in kinds {
            *counts.entry(kind).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(kind_a, count_a), (kind_b, count_b)| {
            count_a.cmp(count_b).then(kind_b.cmp(kind_a))
        })
}

/// Produces a [`RouteBriefing`] from per-airport assessments
#[derive(Debug, Clone)]
pub struct BriefingSynthesizer {
    limits: BriefingLimits,
}

impl BriefingSynthesizer {
    #[must_use]
    pub fn new(limits: &BriefingLimits) -> Self {
        Self {
            limits: limits.clone(),
        }
    }

    #[must_use]
    pub fn synthesize(
        &self,
        assessments: &[AirportAssessment],
        context: &RouteContext,
    ) -> RouteBriefing {
        let overall_category = overall_category(assessments);
        let insufficient_data = overall_category == BriefingCategory::Unknown;
        let hazard_count: usize = assessments.iter().map(|a| a.hazards.len()).sum();
        let high_count: usize = assessments.iter().map(AirportAssessment::high_hazard_count).sum();
        let risk_level = risk_level(overall_category, hazard_count, high_count);

        let critical_airports: Vec<String> =
            airports_where(assessments, |a| a.category.is_critical())
                .into_iter()
                .map(str::to_string)
                .collect();

        let briefing = RouteBriefing {
            overall_category,
            risk_level,
            executive_summary: Self::executive_summary(
                assessments,
                context,
                overall_category,
                risk_level,
            ),
            decision_factors: self.decision_factors(assessments),
            pilot_recommendations: self.recommendations(
                assessments,
                risk_level,
                &critical_airports,
            ),
            critical_airports,
            insufficient_data,
        };

        info!(
            route = %context.label(),
            category = %briefing.overall_category,
            risk = %briefing.risk_level,
            hazards = hazard_count,
            "Synthesized route briefing"
        );
        briefing
    }

    fn executive_summary(
        assessments: &[AirportAssessment],
        context: &RouteContext,
        category: BriefingCategory,
        risk: RiskLevel,
    ) -> String {
        let route = context.label();
        let unknown = airports_where(assessments, |a| a.category == BriefingCategory::Unknown);

        if category == BriefingCategory::Unknown {
            return format!(
                "UNKNOWN: Route {route} has insufficient weather data for a reliable assessment. \
                 Obtain current METAR and TAF reports before departure."
            );
        }

        let high: Vec<&Hazard> = assessments
            .iter()
            .flat_map(|a| a.hazards.iter())
            .filter(|h| h.level == HazardLevel::High)
            .collect();
        let moderate_count = assessments
            .iter()
            .flat_map(|a| a.hazards.iter())
            .filter(|h| h.level == HazardLevel::Moderate)
            .count();

        let mut summary = if category == BriefingCategory::Severe || risk == RiskLevel::High {
            let mut text =
                format!("CAUTION: Route {route} presents significant weather challenges. ");
            if !high.is_empty() {
                let descriptions: Vec<&str> =
                    high.iter().take(2).map(|h| h.description.as_str()).collect();
                text.push_str(&format!(
                    "Critical conditions include {}. ",
                    descriptions.join(", ")
                ));
            }
            let mut severe =
                airports_where(assessments, |a| a.category == BriefingCategory::Severe);
            severe.truncate(3);
            if !severe.is_empty() {
                text.push_str(&format!(
                    "Airports requiring special attention: {}. ",
                    severe.join(", ")
                ));
            }
            text.push_str(
                "Consider alternate routing or delaying departure until conditions improve.",
            );
            text
        } else if category == BriefingCategory::Significant {
            let mut text = format!(
                "MONITOR: Route {route} has marginal conditions requiring careful monitoring. "
            );
            if let Some((kind, airports)) = dominant_hazard(assessments) {
                text.push_str(&format!(
                    "Primary concern is {kind} affecting {airports} airport(s). "
                ));
            }
            if moderate_count > 0 {
                text.push_str(&format!(
                    "Monitor {moderate_count} weather factor(s) that may impact flight operations. "
                ));
            }
            text.push_str("Flight feasible with increased vigilance and contingency planning.");
            text
        } else {
            let mut text =
                format!("FAVORABLE: Route {route} shows generally good flying conditions. ");
            let affected = assessments.iter().filter(|a| !a.hazards.is_empty()).count();
            if affected == 0 {
                text.push_str("Excellent conditions for VFR flight operations.");
            } else {
                text.push_str(&format!(
                    "Minor weather factors noted at {affected} location(s). \
                     Good conditions with standard weather monitoring recommended."
                ));
            }
            text
        };

        if !unknown.is_empty() {
            summary.push_str(&format!(
                " Weather data unavailable for: {}.",
                unknown.join(", ")
            ));
        }
        summary
    }

    /// `AIRPORT: description`, most severe first, then route order
    fn decision_factors(&self, assessments: &[AirportAssessment]) -> Vec<String> {
        let mut ranked: Vec<(usize, &str, &Hazard)> = assessments
            .iter()
            .enumerate()
            .flat_map(|(index, assessment)| {
                assessment
                    .hazards
                    .iter()
                    .map(move |hazard| (index, assessment.airport.as_str(), hazard))
            })
            .collect();
        ranked.sort_by(|(index_a, _, a), (index_b, _, b)| {
            a.kind
                .cmp(&b.kind)
                .then(b.level.cmp(&a.level))
                .then(index_a.cmp(index_b))
        });

        let mut seen = HashSet::new();
        ranked
            .into_iter()
            .filter(|(_, _, hazard)| seen.insert(hazard.description.as_str()))
            .take(self.limits.max_decision_factors)
            .map(|(_, airport, hazard)| format!("{airport}: {}", hazard.description))
            .collect()
    }

    fn recommendations(
        &self,
        assessments: &[AirportAssessment],
        risk: RiskLevel,
        critical_airports: &[String],
    ) -> Vec<String> {
        let mut recommendations: Vec<String> = Vec::new();

        for assessment in assessments {
            let airport = &assessment.airport;
            for hazard in &assessment.hazards {
                match (hazard.kind, hazard.level) {
                    (HazardKind::Thunderstorm, _) => {
                        recommendations.push(format!(
                            "AVOID: Thunderstorms at {airport} - consider alternate airport or delay until storms pass"
                        ));
                        recommendations.push(
                            "RADAR: Monitor weather radar continuously and maintain communication with ATC"
                                .to_string(),
                        );
                    }
                    (HazardKind::LowVisibility, HazardLevel::High) => {
                        recommendations.push(format!(
                            "VISIBILITY: {airport} {} - ensure IFR proficiency and consider alternate",
                            hazard.description.to_lowercase()
                        ));
                        recommendations.push(
                            "APPROACH: Brief instrument approach procedures and minimums".to_string(),
                        );
                    }
                    (HazardKind::LowCeiling, _) => {
                        recommendations.push(format!(
                            "CEILING: {airport} {} - verify approach minimums and alternate requirements",
                            hazard.description.to_lowercase()
                        ));
                    }
                    (HazardKind::StrongWind, _) => {
                        recommendations.push(format!(
                            "WINDS: {airport} {} - calculate crosswind components for all runways",
                            hazard.description.to_lowercase()
                        ));
                        recommendations.push(
                            "RUNWAYS: Consider airports with more favorable runway orientations"
                                .to_string(),
                        );
                    }
                    _ => {}
                }
            }
        }

        let severe = airports_where(assessments, |a| a.category == BriefingCategory::Severe);
        match severe.as_slice() {
            [] => {}
            [only] => recommendations.push(format!(
                "FOCUS: Pay special attention to conditions at {only}"
            )),
            many => recommendations.push(format!(
                "CRITICAL AIRPORTS: Enhanced monitoring required for {}",
                many.join(", ")
            )),
        }

        if risk == RiskLevel::High {
            recommendations
                .push("FUEL: Carry additional fuel for possible diversions or holding".to_string());
            recommendations
                .push("ALTERNATES: File multiple alternate airports along route".to_string());
        }

        if assessments.iter().any(|a| a.has_hazard(HazardKind::Icing)) {
            recommendations
                .push("EQUIPMENT: Verify anti-ice/de-ice systems operational".to_string());
            recommendations.push("PIREPS: Monitor pilot reports for icing conditions".to_string());
        }

        let restricted: Vec<&str> = assessments
            .iter()
            .filter(|a| a.has_hazard(HazardKind::NotamRestriction))
            .map(|a| a.airport.as_str())
            .collect();
        if !restricted.is_empty() {
            recommendations.push(format!(
                "NOTAMS: Review operational NOTAMs for {} before departure",
                restricted.join(", ")
            ));
        }

        if !critical_airports.is_empty() {
            recommendations.push(
                "COMMUNICATION: Establish contact with flight operations for real-time updates"
                    .to_string(),
            );
            recommendations
                .push("UPDATES: Request weather updates every 30 minutes during flight".to_string());
        }

        let unknown = airports_where(assessments, |a| a.category == BriefingCategory::Unknown);
        if !unknown.is_empty() {
            recommendations.push(format!(
                "DATA: Obtain current METAR and TAF for {} before departure",
                unknown.join(", ")
            ));
        }

        if recommendations.is_empty() {
            recommendations.extend([
                "CONDITIONS: Weather favorable for planned flight operations".to_string(),
                "MONITORING: Continue standard weather monitoring procedures".to_string(),
                "EXECUTION: Proceed with normal flight planning and execution".to_string(),
            ]);
        }

        let mut seen = HashSet::new();
        recommendations.retain(|text| seen.insert(text.clone()));
        recommendations.truncate(self.limits.max_recommendations);
        debug!(count = recommendations.len(), "Generated pilot recommendations");
        recommendations
    }
}
