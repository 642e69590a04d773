//! Registre des assignations et indicateurs d'équité.
//!
//! Les cumuls annuels ne sont jamais des compteurs globaux : ils se
//! recalculent à partir du registre (append-only) et sont passés figés au
//! moteur au début de chaque génération.

mod ledger;
mod metrics;

pub use ledger::Ledger;
pub use metrics::{fairness_score, group_metrics, FairnessScore, GroupMetrics};

use crate::model::{AssignmentRecord, DayType};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Cumul pondéré et nombre de jours, entrée du classement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub weighted: f64,
    pub total: u32,
}

/// Agrégat annuel d'une personne (cache recalculable).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairnessSnapshot {
    pub person: String,
    pub year: i32,
    pub regular_days: u32,
    pub friday_days: u32,
    pub weekend_days: u32,
    pub holiday_days: u32,
    pub long_weekend_days: u32,
    pub weighted_days: f64,
    pub total_days: u32,
    pub last_assignment: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fairness_score: Option<FairnessScore>,
}

impl FairnessSnapshot {
    pub fn empty(person: &str, year: i32) -> Self {
        Self {
            person: person.to_string(),
            year,
            regular_days: 0,
            friday_days: 0,
            weekend_days: 0,
            holiday_days: 0,
            long_weekend_days: 0,
            weighted_days: 0.0,
            total_days: 0,
            last_assignment: None,
            fairness_score: None,
        }
    }

    /// Intègre une assignation de la même personne et de la même année.
    pub fn absorb(&mut self, record: &AssignmentRecord) {
        debug_assert_eq!(record.person, self.person);
        debug_assert_eq!(record.date.year(), self.year);
        let counter = match record.day_type {
            DayType::Regular => &mut self.regular_days,
            DayType::Friday => &mut self.friday_days,
            DayType::Weekend => &mut self.weekend_days,
            DayType::Holiday => &mut self.holiday_days,
            DayType::LongWeekendMiddle => &mut self.long_weekend_days,
        };
        *counter += 1;
        self.weighted_days += record.weight;
        self.total_days += 1;
        self.last_assignment = Some(
            self.last_assignment
                .map_or(record.date, |last| last.max(record.date)),
        );
        self.fairness_score = None;
    }

    pub fn standing(&self) -> Standing {
        Standing {
            weighted: self.weighted_days,
            total: self.total_days,
        }
    }
}
