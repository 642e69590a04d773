//! Interfaces des collaborateurs (fériés, groupes, personnes, historique) et
//! implémentation mémoire.

use crate::fairness::{FairnessSnapshot, Ledger};
use crate::model::{AssignmentRecord, Dataset, Group, Holiday, Person};
use chrono::NaiveDate;
use parking_lot::RwLock;

pub trait HolidayRepository {
    /// Fériés qui intersectent `[start, end]`.
    fn list_overlapping(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Vec<Holiday>>;
}

pub trait GroupRepository {
    fn list_groups(&self) -> anyhow::Result<Vec<Group>>;
}

pub trait PersonRepository {
    fn constraints_for(&self, name: &str) -> anyhow::Result<Option<Person>>;
}

pub trait AssignmentHistoryRepository {
    /// Ajout atomique : tout le lot ou rien.
    fn append(&self, records: &[AssignmentRecord]) -> anyhow::Result<()>;
    fn query_ytd(&self, person: &str, year: i32) -> anyhow::Result<FairnessSnapshot>;
    fn records_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<AssignmentRecord>>;
    /// Efface tout l'historique ; renvoie le nombre de lignes supprimées.
    fn reset(&self) -> anyhow::Result<usize>;
}

/// Tous les dépôts à la fois.
pub trait Repositories:
    HolidayRepository + GroupRepository + PersonRepository + AssignmentHistoryRepository
{
}

impl<T> Repositories for T where
    T: HolidayRepository + GroupRepository + PersonRepository + AssignmentHistoryRepository
{
}

/// Dépôt en mémoire, partageable entre threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    holidays: RwLock<Vec<Holiday>>,
    people: RwLock<Vec<Person>>,
    groups: RwLock<Vec<Group>>,
    ledger: RwLock<Ledger>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> anyhow::Result<Self> {
        let ledger = Ledger::from_records(dataset.history)?;
        Ok(Self {
            holidays: RwLock::new(dataset.holidays),
            people: RwLock::new(dataset.people),
            groups: RwLock::new(dataset.groups),
            ledger: RwLock::new(ledger),
        })
    }

    pub fn to_dataset(&self) -> Dataset {
        Dataset {
            holidays: self.holidays.read().clone(),
            people: self.people.read().clone(),
            groups: self.groups.read().clone(),
            history: self.ledger.read().records().to_vec(),
        }
    }

    pub fn add_holiday(&self, holiday: Holiday) {
        self.holidays.write().push(holiday);
    }

    pub fn add_person(&self, person: Person) {
        let mut people = self.people.write();
        match people.iter_mut().find(|p| p.name == person.name) {
            Some(existing) => *existing = person,
            None => people.push(person),
        }
    }

    pub fn add_group(&self, group: Group) {
        let mut groups = self.groups.write();
        match groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => *existing = group,
            None => groups.push(group),
        }
    }

    /// Copie figée du registre.
    pub fn ledger(&self) -> Ledger {
        self.ledger.read().clone()
    }
}

impl HolidayRepository for MemoryStore {
    fn list_overlapping(&self, start: NaiveDate, end: NaiveDate) -> anyhow::Result<Vec<Holiday>> {
        Ok(self
            .holidays
            .read()
            .iter()
            .filter(|h| h.overlaps(start, end))
            .cloned()
            .collect())
    }
}

impl GroupRepository for MemoryStore {
    fn list_groups(&self) -> anyhow::Result<Vec<Group>> {
        Ok(self.groups.read().clone())
    }
}

impl PersonRepository for MemoryStore {
    fn constraints_for(&self, name: &str) -> anyhow::Result<Option<Person>> {
        Ok(self.people.read().iter().find(|p| p.name == name).cloned())
    }
}

impl AssignmentHistoryRepository for MemoryStore {
    fn append(&self, records: &[AssignmentRecord]) -> anyhow::Result<()> {
        self.ledger.write().append(records.to_vec())?;
        Ok(())
    }

    fn query_ytd(&self, person: &str, year: i32) -> anyhow::Result<FairnessSnapshot> {
        Ok(self.ledger.read().snapshot_for(person, year))
    }

    fn records_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> anyhow::Result<Vec<AssignmentRecord>> {
        Ok(self.ledger.read().records_between(start, end))
    }

    fn reset(&self) -> anyhow::Result<usize> {
        Ok(self.ledger.write().reset())
    }
}
