use crate::calendar::WeightTable;
use crate::model::{AssignmentRecord, DayType, GroupId};
use anyhow::Context;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Écart maximal accepté entre deux permanences d'une même personne.
pub const MAX_GAP_DAYS: u32 = 366;

/// Options de génération
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub weight_overrides: BTreeMap<DayType, f64>,
    pub min_gap_days: u32,
    pub long_weekend_min_length: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            weight_overrides: BTreeMap::new(),
            min_gap_days: 1,
            long_weekend_min_length: 3,
        }
    }
}

impl ScheduleConfig {
    /// Charge une config JSON ; les champs absents gardent leur défaut.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_json::from_slice(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SchedError> {
        if self.min_gap_days == 0 {
            return Err(SchedError::InvalidConfig(
                "min_gap_days must be >= 1 (no consecutive days)".to_string(),
            ));
        }
        if self.min_gap_days > MAX_GAP_DAYS {
            return Err(SchedError::InvalidConfig(format!(
                "min_gap_days must be <= {MAX_GAP_DAYS}, got {}",
                self.min_gap_days
            )));
        }
        if self.long_weekend_min_length < 3 {
            return Err(SchedError::InvalidConfig(
                "long_weekend_min_length must be >= 3".to_string(),
            ));
        }
        self.weight_table().map(|_| ())
    }

    pub fn weight_table(&self) -> Result<WeightTable, SchedError> {
        WeightTable::with_overrides(&self.weight_overrides)
    }
}

/// Créneau (date, groupe) resté sans titulaire.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnresolvedSlot {
    pub date: NaiveDate,
    pub group_id: GroupId,
}

/// Avertissements non bloquants d'une génération.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleWarning {
    InfeasibleSlot { date: NaiveDate, group_id: GroupId },
    ConstraintConflict { person: String, reason: String },
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleWarning::InfeasibleSlot { date, group_id } => {
                write!(f, "no eligible person for group {group_id} on {date}")
            }
            ScheduleWarning::ConstraintConflict { person, reason } => {
                write!(f, "constraints of {person} cannot be met: {reason}")
            }
        }
    }
}

/// Résultat d'une génération (engagée ou non).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub year: i32,
    pub month: u32,
    pub records: Vec<AssignmentRecord>,
    pub unresolved: Vec<UnresolvedSlot>,
    pub warnings: Vec<ScheduleWarning>,
}

impl ScheduleOutcome {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn assigned_to(&self, date: NaiveDate, group: &GroupId) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.date == date && &r.group_id == group)
            .map(|r| r.person.as_str())
    }

    pub fn days_of(&self, person: &str) -> Vec<NaiveDate> {
        self.records
            .iter()
            .filter(|r| r.person == person)
            .map(|r| r.date)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    DoubleBooking,
    ConsecutiveDays,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub person: String,
    pub first: NaiveDate,
    pub second: NaiveDate,
    pub kind: ConflictKind,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            ConflictKind::DoubleBooking => "booked twice",
            ConflictKind::ConsecutiveDays => "on consecutive days",
        };
        write!(f, "{} {what} ({} / {})", self.person, self.first, self.second)
    }
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid period: {year}-{month}")]
    InvalidPeriod { year: i32, month: u32 },
    #[error("invalid weight {weight} for {day_type}: must be finite and > 0")]
    InvalidWeight { day_type: DayType, weight: f64 },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unknown person: {0}")]
    UnknownPerson(String),
    #[error("unknown group: {0}")]
    UnknownGroup(String),
    #[error("group {0} has no member able to take a day")]
    InsufficientGroupMembers(GroupId),
    #[error("no group to schedule")]
    NoGroups,
    #[error("period {0} already has assignments; reset history before regenerating")]
    PeriodAlreadyScheduled(String),
    #[error("ledger conflict: {0}")]
    LedgerConflict(Conflict),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
