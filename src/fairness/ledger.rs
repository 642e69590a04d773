use super::{group_metrics, FairnessScore, FairnessSnapshot, GroupMetrics, Standing};
use crate::model::{AssignmentRecord, Group};
use crate::scheduler::{detect_conflicts, Conflict, ConflictKind, SchedError};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// Registre append-only des assignations, avec cache des agrégats annuels.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    records: Vec<AssignmentRecord>,
    dates: BTreeMap<String, BTreeSet<NaiveDate>>,
    snapshots: BTreeMap<(String, i32), FairnessSnapshot>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconstruit un registre (et son cache) depuis des lignes persistées.
    pub fn from_records(records: Vec<AssignmentRecord>) -> Result<Self, SchedError> {
        let mut ledger = Self::new();
        ledger.append(records)?;
        Ok(ledger)
    }

    pub fn records(&self) -> &[AssignmentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ajoute un lot entier ou rien : le lot est d'abord vérifié contre le
    /// registre (pas de doublon, pas de jours consécutifs).
    pub fn append(&mut self, batch: Vec<AssignmentRecord>) -> Result<usize, SchedError> {
        self.check(&batch)?;
        let added = batch.len();
        for record in batch {
            self.dates
                .entry(record.person.clone())
                .or_default()
                .insert(record.date);
            let key = (record.person.clone(), record.date.year());
            if let Some(snapshot) = self.snapshots.get_mut(&key) {
                snapshot.absorb(&record);
            } else {
                let mut snapshot = FairnessSnapshot::empty(&record.person, record.date.year());
                snapshot.absorb(&record);
                self.snapshots.insert(key, snapshot);
            }
            self.records.push(record);
        }
        tracing::debug!(added, total = self.records.len(), "ledger append");
        Ok(added)
    }

    fn check(&self, batch: &[AssignmentRecord]) -> Result<(), SchedError> {
        let mut seen: BTreeMap<&str, BTreeSet<NaiveDate>> = BTreeMap::new();
        for record in batch {
            let person = record.person.as_str();
            let sets = [self.dates.get(person), seen.get(person)];
            for dates in sets.into_iter().flatten() {
                if let Some(conflict) = clash(person, dates, record.date) {
                    return Err(SchedError::LedgerConflict(conflict));
                }
            }
            seen.entry(person).or_default().insert(record.date);
        }
        Ok(())
    }

    /// Agrégat annuel ; recalculé depuis le registre s'il n'est pas en cache.
    pub fn snapshot_for(&self, person: &str, year: i32) -> FairnessSnapshot {
        self.snapshots
            .get(&(person.to_string(), year))
            .cloned()
            .unwrap_or_else(|| self.recompute(person, year))
    }

    pub fn recompute(&self, person: &str, year: i32) -> FairnessSnapshot {
        self.records
            .iter()
            .filter(|r| r.person == person && r.date.year() == year)
            .fold(FairnessSnapshot::empty(person, year), |mut acc, r| {
                acc.absorb(r);
                acc
            })
    }

    /// Cumuls de l'année de `date`, strictement avant `date`.
    pub fn standings_before(&self, date: NaiveDate) -> BTreeMap<String, Standing> {
        let mut out: BTreeMap<String, Standing> = BTreeMap::new();
        for record in self
            .records
            .iter()
            .filter(|r| r.date.year() == date.year() && r.date < date)
        {
            let standing = out.entry(record.person.clone()).or_default();
            standing.weighted += record.weight;
            standing.total += 1;
        }
        out
    }

    pub fn records_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<AssignmentRecord> {
        self.records
            .iter()
            .filter(|r| start <= r.date && r.date <= end)
            .cloned()
            .collect()
    }

    /// Score d'une personne rapporté à la moyenne de `peers` (elle incluse).
    pub fn person_fairness(&self, person: &str, peers: &[String], year: i32) -> FairnessScore {
        let mut names: BTreeSet<&str> = peers.iter().map(String::as_str).collect();
        names.insert(person);
        let snapshots: Vec<FairnessSnapshot> =
            names.iter().map(|n| self.snapshot_for(n, year)).collect();
        let n = snapshots.len() as f64;
        let average_days = snapshots.iter().map(|s| f64::from(s.total_days)).sum::<f64>() / n;
        let average_weighted = snapshots.iter().map(|s| s.weighted_days).sum::<f64>() / n;
        let own = self.snapshot_for(person, year);
        super::fairness_score(
            f64::from(own.total_days),
            average_days,
            own.weighted_days,
            average_weighted,
        )
    }

    pub fn group_metrics(&self, group: &Group, year: i32) -> GroupMetrics {
        let members = group
            .members
            .iter()
            .map(|m| self.snapshot_for(m, year))
            .collect();
        group_metrics(&group.id, year, members)
    }

    /// Revérifie les contraintes dures sur tout le registre.
    pub fn conflicts(&self) -> Vec<Conflict> {
        detect_conflicts(&self.records)
    }

    /// Remise à zéro complète et explicite de l'historique.
    pub fn reset(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        self.dates.clear();
        self.snapshots.clear();
        tracing::info!(removed, "history reset");
        removed
    }
}

fn clash(person: &str, dates: &BTreeSet<NaiveDate>, date: NaiveDate) -> Option<Conflict> {
    if dates.contains(&date) {
        return Some(Conflict {
            person: person.to_string(),
            first: date,
            second: date,
            kind: ConflictKind::DoubleBooking,
        });
    }
    let day = Duration::days(1);
    dates
        .range(date - day..=date + day)
        .next()
        .map(|&other| Conflict {
            person: person.to_string(),
            first: other.min(date),
            second: other.max(date),
            kind: ConflictKind::ConsecutiveDays,
        })
}
