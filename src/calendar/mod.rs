//! Classification des jours, poids et détection des ponts.

mod classify;
mod long_weekend;
mod weights;

pub use classify::{classify_day, is_friday, is_weekend, weekday_number, HolidayCalendar};
pub use long_weekend::{detect as detect_long_weekends, middle_days, LongWeekend};
pub use weights::WeightTable;

use crate::model::{DayProfile, DayType, Holiday};
use crate::scheduler::SchedError;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Intervalle fermé de dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn intersects(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && start <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Élargit l'intervalle de `days` jours de chaque côté.
    pub fn widen(&self, days: i64) -> Self {
        Self {
            start: self.start - Duration::days(days),
            end: self.end + Duration::days(days),
        }
    }
}

/// Mois cible d'une génération.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, SchedError> {
        if !(1..=12).contains(&month) || NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(SchedError::InvalidPeriod { year, month });
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> Result<NaiveDate, SchedError> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or(SchedError::InvalidPeriod {
            year: self.year,
            month: self.month,
        })
    }

    pub fn last_day(&self) -> Result<NaiveDate, SchedError> {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .ok_or(SchedError::InvalidPeriod {
                year: self.year,
                month: self.month,
            })
    }

    pub fn range(&self) -> Result<DateRange, SchedError> {
        Ok(DateRange::new(self.first_day()?, self.last_day()?))
    }

    pub fn num_days(&self) -> Result<u32, SchedError> {
        Ok(self.last_day()?.day())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Calcule les `DayProfile` d'une plage : classification, ponts puis poids.
#[derive(Debug, Clone)]
pub struct DayProfiler {
    calendar: HolidayCalendar,
    weights: WeightTable,
    long_weekend_min_length: u32,
}

impl DayProfiler {
    pub fn new(holidays: &[Holiday], weights: WeightTable, long_weekend_min_length: u32) -> Self {
        Self {
            calendar: HolidayCalendar::new(holidays),
            weights,
            long_weekend_min_length,
        }
    }

    pub fn calendar(&self) -> &HolidayCalendar {
        &self.calendar
    }

    pub fn long_weekends(&self, range: DateRange) -> Vec<LongWeekend> {
        detect_long_weekends(range, &self.calendar, self.long_weekend_min_length)
    }

    pub fn profiles(&self, range: DateRange) -> Vec<DayProfile> {
        let middles: BTreeSet<NaiveDate> = middle_days(&self.long_weekends(range));
        range
            .days()
            .map(|date| self.make_profile(date, middles.contains(&date)))
            .collect()
    }

    pub fn profile(&self, date: NaiveDate) -> DayProfile {
        let is_middle = self
            .long_weekends(DateRange::new(date, date))
            .iter()
            .any(|run| run.is_middle(date));
        self.make_profile(date, is_middle)
    }

    fn make_profile(&self, date: NaiveDate, is_middle: bool) -> DayProfile {
        let day_type = if is_middle {
            DayType::LongWeekendMiddle
        } else {
            self.calendar.classify(date)
        };
        DayProfile {
            date,
            day_type,
            weight: self.weights.weight(day_type),
        }
    }
}
