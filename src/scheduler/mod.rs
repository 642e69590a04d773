mod assignment;
mod conflicts;
mod types;
mod util;

pub use conflicts::detect_conflicts;
pub use types::{
    Conflict, ConflictKind, SchedError, ScheduleConfig, ScheduleOutcome, ScheduleWarning,
    UnresolvedSlot, MAX_GAP_DAYS,
};

use crate::calendar::Period;
use crate::fairness::Standing;
use crate::model::{AssignmentRecord, DayProfile, Group, Person};
use std::collections::BTreeMap;

/// Entrée figée d'une génération : tout est lu une seule fois au départ.
#[derive(Debug, Clone, Copy)]
pub struct RunInput<'a> {
    pub period: Period,
    pub profiles: &'a [DayProfile],
    pub groups: &'a [Group],
    pub people: &'a BTreeMap<String, Person>,
    /// Totaux de l'année avant le mois cible.
    pub standings: &'a BTreeMap<String, Standing>,
    /// Assignations déjà historisées autour du mois (bords inclus).
    pub history: &'a [AssignmentRecord],
}

/// Moteur d'assignation gloutonne jour par jour.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentEngine {
    min_gap_days: u32,
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self { min_gap_days: 1 }
    }
}

impl AssignmentEngine {
    pub fn new(config: &ScheduleConfig) -> Result<Self, SchedError> {
        config.validate()?;
        Ok(Self {
            min_gap_days: config.min_gap_days,
        })
    }

    pub fn min_gap_days(&self) -> u32 {
        self.min_gap_days
    }

    /// Produit une assignation par groupe et par jour, ou un créneau non
    /// résolu. Aucune entrée n'est modifiée.
    pub fn run(&self, input: &RunInput<'_>) -> Result<ScheduleOutcome, SchedError> {
        assignment::run(self, input)
    }
}
