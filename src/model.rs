use crate::scheduler::SchedError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifiant fort pour Holiday
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HolidayId(String);

impl HolidayId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HolidayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Jour(s) férié(s) : intervalle fermé `[start, end]`.
///
/// Les bornes sont privées pour garantir `end >= start`, y compris à la
/// désérialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HolidayRow")]
pub struct Holiday {
    id: HolidayId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Deserialize)]
struct HolidayRow {
    #[serde(default)]
    id: Option<HolidayId>,
    start_date: NaiveDate,
    #[serde(default)]
    end_date: Option<NaiveDate>,
    #[serde(default)]
    name: Option<String>,
}

impl TryFrom<HolidayRow> for Holiday {
    type Error = SchedError;

    fn try_from(row: HolidayRow) -> Result<Self, Self::Error> {
        let mut holiday = Holiday::new(row.start_date, row.end_date, row.name)?;
        if let Some(id) = row.id {
            holiday.id = id;
        }
        Ok(holiday)
    }
}

impl Holiday {
    /// Crée un férié ; `end_date` absent = un seul jour.
    pub fn new(
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<Self, SchedError> {
        let end_date = end_date.unwrap_or(start_date);
        if end_date < start_date {
            return Err(SchedError::InvalidDateRange {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id: HolidayId::random(),
            start_date,
            end_date,
            name,
        })
    }

    pub fn single(date: NaiveDate, name: &str) -> Self {
        Self {
            id: HolidayId::random(),
            start_date: date,
            end_date: date,
            name: Some(name.to_string()),
        }
    }

    pub fn id(&self) -> &HolidayId {
        &self.id
    }
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Intersection avec l'intervalle fermé `[start, end]`.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && start <= self.end_date
    }

    pub fn is_multi_day(&self) -> bool {
        self.end_date != self.start_date
    }
}

/// Identifiant fort pour Group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(String);

impl GroupId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Groupe de permanence : une personne par jour.
///
/// L'ordre des membres est stable et sert de départage final.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Group {
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        Self {
            id: GroupId::new(id),
            members: Vec::new(),
        }
    }

    pub fn with_members<I, S>(id: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: GroupId::new(id),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Ajoute un membre s'il n'y est pas déjà.
    pub fn add_member(&mut self, name: &str) {
        if !self.members.iter().any(|m| m == name) {
            self.members.push(name.to_string());
        }
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.members.iter().position(|m| m == name)
    }

    /// Retire un membre ; `false` s'il n'en faisait pas partie.
    pub fn remove_member(&mut self, name: &str) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != name);
        self.members.len() != before
    }
}

/// Personne et ses contraintes mensuelles (valables tous groupes confondus).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    #[serde(default)]
    pub min_days_per_month: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_days_per_month: Option<u32>,
}

impl Person {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            min_days_per_month: 0,
            max_days_per_month: None,
        }
    }

    pub fn with_limits(mut self, min: u32, max: Option<u32>) -> Self {
        self.min_days_per_month = min;
        self.max_days_per_month = max;
        self
    }

    pub fn reached_max(&self, assigned: u32) -> bool {
        self.max_days_per_month.is_some_and(|max| assigned >= max)
    }
}

/// Type de jour, du moins au plus pénible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    Regular,
    Friday,
    Weekend,
    Holiday,
    LongWeekendMiddle,
}

impl DayType {
    pub const ALL: [DayType; 5] = [
        DayType::Regular,
        DayType::Friday,
        DayType::Weekend,
        DayType::Holiday,
        DayType::LongWeekendMiddle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayType::Regular => "regular",
            DayType::Friday => "friday",
            DayType::Weekend => "weekend",
            DayType::Holiday => "holiday",
            DayType::LongWeekendMiddle => "long_weekend_middle",
        }
    }

    /// Week-end ou férié (y compris milieu de pont).
    pub fn is_non_working(self) -> bool {
        match self {
            DayType::Weekend | DayType::Holiday | DayType::LongWeekendMiddle => true,
            DayType::Regular | DayType::Friday => false,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DayType {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        DayType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| SchedError::InvalidConfig(format!("unknown day type: {s}")))
    }
}

/// Profil calculé d'une date (jamais persisté).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayProfile {
    pub date: NaiveDate,
    pub day_type: DayType,
    pub weight: f64,
}

/// Assignation historisée ; immuable une fois écrite dans le registre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub person: String,
    pub group_id: GroupId,
    pub date: NaiveDate,
    pub day_type: DayType,
    pub weight: f64,
}

impl AssignmentRecord {
    pub fn new(person: &str, group_id: &GroupId, profile: &DayProfile) -> Self {
        Self {
            person: person.to_string(),
            group_id: group_id.clone(),
            date: profile.date,
            day_type: profile.day_type,
            weight: profile.weight,
        }
    }
}

/// Jeu de données complet (ce qui survit à un redémarrage).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Dataset {
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub history: Vec<AssignmentRecord>,
}

impl Dataset {
    pub fn find_person<'a>(&'a self, name: &str) -> Option<&'a Person> {
        self.people.iter().find(|p| p.name == name)
    }
    pub fn find_group<'a>(&'a self, id: &GroupId) -> Option<&'a Group> {
        self.groups.iter().find(|g| &g.id == id)
    }

    /// Crée ou met à jour une personne et l'inscrit dans les groupes donnés
    /// (créés au besoin).
    pub fn upsert_person(&mut self, person: Person, groups: &[GroupId]) {
        for id in groups {
            let pos = match self.groups.iter().position(|g| &g.id == id) {
                Some(pos) => pos,
                None => {
                    self.groups.push(Group::new(id.as_str()));
                    self.groups.len() - 1
                }
            };
            self.groups[pos].add_member(&person.name);
        }
        match self.people.iter_mut().find(|p| p.name == person.name) {
            Some(existing) => *existing = person,
            None => self.people.push(person),
        }
    }

    pub fn add_group(&mut self, id: &GroupId) -> bool {
        if self.find_group(id).is_some() {
            return false;
        }
        self.groups.push(Group::new(id.as_str()));
        true
    }

    /// Supprime un groupe ; l'historique déjà engagé est conservé.
    pub fn delete_group(&mut self, id: &GroupId) -> bool {
        let before = self.groups.len();
        self.groups.retain(|g| &g.id != id);
        self.groups.len() != before
    }

    /// Désinscrit `person` de `group` ; `Ok(false)` si elle n'en était pas membre.
    pub fn remove_member(&mut self, group: &GroupId, person: &str) -> Result<bool, SchedError> {
        self.groups
            .iter_mut()
            .find(|g| &g.id == group)
            .map(|g| g.remove_member(person))
            .ok_or_else(|| SchedError::UnknownGroup(group.to_string()))
    }

    /// Planning engagé d'un mois, trié par date puis dans l'ordre des groupes.
    pub fn schedule_of(&self, year: i32, month: u32) -> Vec<&AssignmentRecord> {
        let mut out: Vec<&AssignmentRecord> = self
            .history
            .iter()
            .filter(|r| r.date.year() == year && r.date.month() == month)
            .collect();
        out.sort_by_key(|r| {
            let slot = self.groups.iter().position(|g| g.id == r.group_id);
            (r.date, slot.unwrap_or(usize::MAX), r.group_id.clone())
        });
        out
    }

    /// Assignations d'une personne, éventuellement limitées à une année ou un mois.
    pub fn person_schedule(
        &self,
        person: &str,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Vec<&AssignmentRecord> {
        let mut out: Vec<&AssignmentRecord> = self
            .history
            .iter()
            .filter(|r| r.person == person)
            .filter(|r| year.map_or(true, |y| r.date.year() == y))
            .filter(|r| month.map_or(true, |m| r.date.month() == m))
            .collect();
        out.sort_by_key(|r| r.date);
        out
    }

    /// Fériés qui touchent l'année `year`, par date de début.
    pub fn holidays_in_year(&self, year: i32) -> Vec<&Holiday> {
        let mut out: Vec<&Holiday> = self
            .holidays
            .iter()
            .filter(|h| h.start_date.year() <= year && year <= h.end_date.year())
            .collect();
        out.sort_by_key(|h| (h.start_date, h.end_date));
        out
    }

    /// Remplace les dates d'un férié existant (même identifiant) ; le nom
    /// n'est changé que s'il est fourni.
    pub fn update_holiday(
        &mut self,
        id: &HolidayId,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
        name: Option<String>,
    ) -> Result<bool, SchedError> {
        let Some(slot) = self.holidays.iter_mut().find(|h| &h.id == id) else {
            return Ok(false);
        };
        let name = name.or_else(|| slot.name.clone());
        let mut updated = Holiday::new(start_date, end_date, name)?;
        updated.id = id.clone();
        *slot = updated;
        Ok(true)
    }

    pub fn delete_holiday(&mut self, id: &HolidayId) -> bool {
        let before = self.holidays.len();
        self.holidays.retain(|h| &h.id != id);
        self.holidays.len() != before
    }
}
