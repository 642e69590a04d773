use crate::model::{DayType, Holiday};
use chrono::{Datelike, NaiveDate, Weekday};

/// Numéro de jour avec lundi = 0 ... dimanche = 6.
pub fn weekday_number(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

/// Samedi ou dimanche (numéro >= 5).
pub fn is_weekend(date: NaiveDate) -> bool {
    weekday_number(date) >= 5
}

pub fn is_friday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Fri
}

/// Fériés fusionnés en intervalles disjoints, triés et non contigus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    spans: Vec<(NaiveDate, NaiveDate)>,
}

impl HolidayCalendar {
    pub fn new(holidays: &[Holiday]) -> Self {
        let mut raw: Vec<(NaiveDate, NaiveDate)> = holidays
            .iter()
            .map(|h| (h.start_date(), h.end_date()))
            .collect();
        raw.sort();

        let mut spans: Vec<(NaiveDate, NaiveDate)> = Vec::with_capacity(raw.len());
        for (start, end) in raw {
            if let Some(last) = spans.last_mut() {
                // chevauchement ou jours contigus
                if last.1.succ_opt().map_or(true, |next| start <= next) {
                    last.1 = last.1.max(end);
                    continue;
                }
            }
            spans.push((start, end));
        }
        Self { spans }
    }

    pub fn spans(&self) -> &[(NaiveDate, NaiveDate)] {
        &self.spans
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let idx = self.spans.partition_point(|(start, _)| *start <= date);
        idx > 0 && date <= self.spans[idx - 1].1
    }

    /// Jour non travaillé : week-end ou férié.
    pub fn is_non_working(&self, date: NaiveDate) -> bool {
        is_weekend(date) || self.contains(date)
    }

    /// Classification de base, avant détection des ponts.
    pub fn classify(&self, date: NaiveDate) -> DayType {
        if self.contains(date) {
            DayType::Holiday
        } else if is_weekend(date) {
            DayType::Weekend
        } else if is_friday(date) {
            DayType::Friday
        } else {
            DayType::Regular
        }
    }
}

/// Raccourci sans calendrier pré-construit.
pub fn classify_day(date: NaiveDate, holidays: &[Holiday]) -> DayType {
    HolidayCalendar::new(holidays).classify(date)
}
