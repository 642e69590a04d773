//! Service de génération : lecture cohérente des dépôts, calcul, puis
//! engagement atomique, un seul run à la fois par mois.

use crate::calendar::{DayProfiler, Period};
use crate::fairness::{FairnessSnapshot, GroupMetrics, Ledger};
use crate::model::{Group, GroupId, Person};
use crate::repository::Repositories;
use crate::scheduler::{AssignmentEngine, RunInput, SchedError, ScheduleConfig, ScheduleOutcome};
use chrono::Duration;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Marge de lecture des fériés autour du mois (détection des ponts).
const HOLIDAY_LOOKAROUND_DAYS: i64 = 31;

/// Verrous exclusifs par (année, mois).
#[derive(Debug, Default)]
pub struct PeriodLocks {
    locks: Mutex<HashMap<Period, Arc<Mutex<()>>>>,
}

impl PeriodLocks {
    pub fn handle(&self, period: Period) -> Arc<Mutex<()>> {
        self.locks.lock().entry(period).or_default().clone()
    }
}

/// Sujet d'une demande d'indicateurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FairnessSubject {
    Person(String),
    Group(GroupId),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FairnessReport {
    Person(FairnessSnapshot),
    Group(GroupMetrics),
}

pub struct Planner<S> {
    store: S,
    locks: PeriodLocks,
}

impl<S: Repositories> Planner<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: PeriodLocks::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Calcule le planning du mois sans rien engager.
    pub fn plan(
        &self,
        year: i32,
        month: u32,
        config: &ScheduleConfig,
    ) -> Result<ScheduleOutcome, SchedError> {
        let period = Period::new(year, month)?;
        let lock = self.locks.handle(period);
        let _guard = lock.lock();
        self.compute(period, config)
    }

    /// Calcule puis historise toutes les assignations d'un bloc.
    pub fn generate_schedule(
        &self,
        year: i32,
        month: u32,
        config: &ScheduleConfig,
    ) -> Result<ScheduleOutcome, SchedError> {
        let period = Period::new(year, month)?;
        let lock = self.locks.handle(period);
        let _guard = lock.lock();

        let outcome = self.compute(period, config)?;
        // le registre revérifie le lot : un mois voisin a pu être engagé entre-temps
        if let Err(err) = self.store.append(&outcome.records).map_err(typed) {
            tracing::warn!(%period, error = %err, "commit rejected");
            return Err(err);
        }
        tracing::info!(
            %period,
            committed = outcome.records.len(),
            unresolved = outcome.unresolved.len(),
            "schedule committed"
        );
        Ok(outcome)
    }

    fn compute(
        &self,
        period: Period,
        config: &ScheduleConfig,
    ) -> Result<ScheduleOutcome, SchedError> {
        config.validate()?;
        let engine = AssignmentEngine::new(config)?;
        let range = period.range()?;
        let gap = i64::from(config.min_gap_days);

        let groups = self.store.list_groups()?;
        if groups.is_empty() {
            return Err(SchedError::NoGroups);
        }
        let people = self.people_of(&groups)?;

        let lookaround = range.widen(HOLIDAY_LOOKAROUND_DAYS);
        let holidays = self.store.list_overlapping(lookaround.start, lookaround.end)?;
        let profiler = DayProfiler::new(
            &holidays,
            config.weight_table()?,
            config.long_weekend_min_length,
        );
        let profiles = profiler.profiles(range);

        // instantané unique de l'historique : début d'année jusqu'au bord suivant
        let year_start = Period::new(period.year, 1)?.first_day()?;
        let read_start = year_start.min(range.start - Duration::days(gap));
        let read_end = range.end + Duration::days(gap);
        let ledger = Ledger::from_records(self.store.records_between(read_start, read_end)?)?;

        if let Some(existing) = ledger
            .records()
            .iter()
            .find(|r| range.contains(r.date) && groups.iter().any(|g| g.id == r.group_id))
        {
            tracing::warn!(%period, date = %existing.date, "period already scheduled");
            return Err(SchedError::PeriodAlreadyScheduled(period.to_string()));
        }

        let standings = ledger.standings_before(range.start);
        let boundary = ledger.records_between(range.start - Duration::days(gap), read_end);

        engine.run(&RunInput {
            period,
            profiles: &profiles,
            groups: &groups,
            people: &people,
            standings: &standings,
            history: &boundary,
        })
    }

    fn people_of(&self, groups: &[Group]) -> Result<BTreeMap<String, Person>, SchedError> {
        let mut people = BTreeMap::new();
        for name in groups.iter().flat_map(|g| g.members.iter()) {
            if people.contains_key(name) {
                continue;
            }
            let person = self
                .store
                .constraints_for(name)?
                .ok_or_else(|| SchedError::UnknownPerson(name.clone()))?;
            people.insert(name.clone(), person);
        }
        Ok(people)
    }

    /// Indicateurs d'une personne (score rapporté à ses co-équipiers) ou
    /// d'un groupe.
    pub fn fairness_metrics(
        &self,
        subject: &FairnessSubject,
        year: i32,
    ) -> Result<FairnessReport, SchedError> {
        let start = Period::new(year, 1)?.first_day()?;
        let end = Period::new(year, 12)?.last_day()?;
        let ledger = Ledger::from_records(self.store.records_between(start, end)?)?;
        let groups = self.store.list_groups()?;

        match subject {
            FairnessSubject::Group(id) => {
                let group = groups
                    .iter()
                    .find(|g| &g.id == id)
                    .ok_or_else(|| SchedError::UnknownGroup(id.to_string()))?;
                Ok(FairnessReport::Group(ledger.group_metrics(group, year)))
            }
            FairnessSubject::Person(name) => {
                let peers: Vec<String> = groups
                    .iter()
                    .filter(|g| g.members.contains(name))
                    .flat_map(|g| g.members.iter().cloned())
                    .collect();
                if peers.is_empty() && self.store.constraints_for(name)?.is_none() {
                    return Err(SchedError::UnknownPerson(name.clone()));
                }
                let mut snapshot = self.store.query_ytd(name, year)?;
                snapshot.fairness_score = Some(ledger.person_fairness(name, &peers, year));
                Ok(FairnessReport::Person(snapshot))
            }
        }
    }
}

/// Remonte l'erreur typée quand un dépôt l'a enveloppée dans `anyhow`.
fn typed(err: anyhow::Error) -> SchedError {
    match err.downcast::<SchedError>() {
        Ok(err) => err,
        Err(err) => SchedError::Other(err),
    }
}
