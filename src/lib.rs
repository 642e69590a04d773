#![forbid(unsafe_code)]
//! Roulement : répartition équitable des permanences journalières.
//!
//! - Une personne par groupe et par jour, jamais deux jours de suite.
//! - Jours pondérés (vendredi, week-end, férié, milieu de pont).
//! - Historique append-only ; les cumuls annuels en sont dérivés.
//! - Génération déterministe : mêmes entrées, même sortie.

pub mod calendar;
pub mod fairness;
pub mod io;
pub mod model;
pub mod planner;
pub mod repository;
pub mod scheduler;
pub mod storage;

pub use calendar::{DateRange, DayProfiler, HolidayCalendar, LongWeekend, Period, WeightTable};
pub use fairness::{FairnessScore, FairnessSnapshot, GroupMetrics, Ledger, Standing};
pub use model::{
    AssignmentRecord, Dataset, DayProfile, DayType, Group, GroupId, Holiday, HolidayId, Person,
};
pub use planner::{FairnessReport, FairnessSubject, Planner};
pub use repository::{
    AssignmentHistoryRepository, GroupRepository, HolidayRepository, MemoryStore,
    PersonRepository,
};
pub use scheduler::{
    AssignmentEngine, Conflict, ConflictKind, RunInput, SchedError, ScheduleConfig,
    ScheduleOutcome, ScheduleWarning, UnresolvedSlot,
};
pub use storage::{JsonStorage, Storage};
