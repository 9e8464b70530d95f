//! Terminal forecast model and period resolution

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ObservationFields;

/// Kind of TAF change group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Base,
    Fm,
    Becmg,
    Tempo,
    Prob,
}

impl ChangeKind {
    /// TEMPO and PROB groups only overlay the prevailing conditions
    #[must_use]
    pub fn is_overlay(&self) -> bool {
        matches!(self, ChangeKind::Tempo | ChangeKind::Prob)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Base => write!(f, "BASE"),
            ChangeKind::Fm => write!(f, "FM"),
            ChangeKind::Becmg => write!(f, "BECMG"),
            ChangeKind::Tempo => write!(f, "TEMPO"),
            ChangeKind::Prob => write!(f, "PROB"),
        }
    }
}

/// One TAF group with only the fields it states explicitly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub change_kind: ChangeKind,
    pub probability_pct: Option<u8>,
    pub fields: ObservationFields,
    /// Operationally significant changes announced by this group
    pub significant_changes: Vec<String>,
}

impl ForecastPeriod {
    /// Half-open validity check
    #[must_use]
    pub fn covers(&self, time: DateTime<Utc>) -> bool {
        self.valid_from <= time && time < self.valid_to
    }

    #[must_use]
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.valid_from < to && from < self.valid_to
    }
}

/// Conditions in force at an instant, after overlay composition
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConditions {
    pub fields: ObservationFields,
    pub change_kind: ChangeKind,
}

/// Decoded TAF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TafForecast {
    pub station: String,
    pub issue_time: Option<DateTime<Utc>>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub amendment: bool,
    /// Groups in declaration order, starting with the base forecast
    pub periods: Vec<ForecastPeriod>,
}

impl TafForecast {
    #[must_use]
    pub fn covers(&self, time: DateTime<Utc>) -> bool {
        self.valid_from <= time && time < self.valid_to
    }

    /// Prevailing (non-overlay) conditions at `time`.
    ///
    /// FM replaces everything that came before; BECMG changes the stated fields
    /// from the start of its transition window onwards.
    fn prevailing_at(&self, time: DateTime<Utc>) -> Option<(ObservationFields, ChangeKind)> {
        let mut state: Option<(ObservationFields, ChangeKind)> = None;
        for period in self.periods.iter().filter(|p| !p.change_kind.is_overlay()) {
            if period.valid_from > time {
                continue;
            }
            state = Some(match (period.change_kind, state) {
                (ChangeKind::Becmg, Some((fields, _))) => {
                    (fields.overlay(&period.fields), ChangeKind::Becmg)
                }
                (kind, _) => (period.fields.clone(), kind),
            });
        }
        state
    }

    /// Conditions at `time`, or `None` outside the validity window.
    ///
    /// A covering TEMPO/PROB group wins over the prevailing forecast; when several
    /// cover the instant the latest declared one is used. Its unset fields come
    /// from the prevailing conditions at the start of its window.
    #[must_use]
    pub fn conditions_at(&self, time: DateTime<Utc>) -> Option<ResolvedConditions> {
        if !self.covers(time) {
            return None;
        }

        let overlay = self
            .periods
            .iter()
            .rfind(|p| p.change_kind.is_overlay() && p.covers(time));

        if let Some(overlay) = overlay {
            let base = self
                .prevailing_at(overlay.valid_from)
                .map(|(fields, _)| fields)
                .unwrap_or_default();
            return Some(ResolvedConditions {
                fields: base.overlay(&overlay.fields),
                change_kind: overlay.change_kind,
            });
        }

        self.prevailing_at(time)
            .map(|(fields, change_kind)| ResolvedConditions {
                fields,
                change_kind,
            })
    }

    /// Like [`TafForecast::conditions_at`], clamping `time` into the validity
    /// window first so an instant outside it takes the nearest period
    #[must_use]
    pub fn conditions_nearest(&self, time: DateTime<Utc>) -> Option<ResolvedConditions> {
        if self.valid_to <= self.valid_from {
            return None;
        }
        let latest = self.valid_to - Duration::seconds(1);
        let clamped = time.clamp(self.valid_from, latest);
        self.conditions_at(clamped)
    }

    /// Periods overlapping the window `[from, to)`
    pub fn periods_overlapping(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl Iterator<Item = &ForecastPeriod> {
        self.periods.iter().filter(move |p| p.overlaps(from, to))
    }
}
