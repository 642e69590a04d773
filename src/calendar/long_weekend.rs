use super::{classify::HolidayCalendar, DateRange};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// Suite maximale de jours non travaillés (pont).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LongWeekend {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LongWeekend {
    pub fn len(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    /// Jours du pont hors premier et dernier.
    pub fn middle_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().skip(1).take_while(move |d| *d < end)
    }

    pub fn is_middle(&self, date: NaiveDate) -> bool {
        self.start < date && date < self.end
    }
}

/// Détecte les ponts (suites >= `min_len`) qui touchent `range`.
///
/// Le balayage déborde de `range` tant que les jours restent chômés, pour
/// attraper les ponts commencés le mois précédent ou finissant le suivant.
pub fn detect(range: DateRange, calendar: &HolidayCalendar, min_len: u32) -> Vec<LongWeekend> {
    let scan_start = extend(range.start, calendar, |d| d.pred_opt());
    let scan_end = extend(range.end, calendar, |d| d.succ_opt());

    let mut runs = Vec::new();
    let mut open: Option<NaiveDate> = None;
    let mut last = scan_start;
    for date in DateRange::new(scan_start, scan_end).days() {
        match (calendar.is_non_working(date), open) {
            (true, None) => open = Some(date),
            (false, Some(start)) => {
                runs.push(LongWeekend { start, end: last });
                open = None;
            }
            _ => {}
        }
        last = date;
    }
    if let Some(start) = open {
        runs.push(LongWeekend { start, end: last });
    }

    runs.retain(|run| run.len() >= i64::from(min_len) && range.intersects(run.start, run.end));
    tracing::trace!(count = runs.len(), "long weekends detected");
    runs
}

/// Ensemble des jours « milieu de pont ».
pub fn middle_days(runs: &[LongWeekend]) -> BTreeSet<NaiveDate> {
    runs.iter().flat_map(|run| run.middle_days()).collect()
}

fn extend<F>(from: NaiveDate, calendar: &HolidayCalendar, step: F) -> NaiveDate
where
    F: Fn(NaiveDate) -> Option<NaiveDate>,
{
    let mut edge = from;
    while let Some(next) = step(edge) {
        if !calendar.is_non_working(next) {
            break;
        }
        edge = next;
    }
    edge
}
