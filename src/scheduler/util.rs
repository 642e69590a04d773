use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

/// Une date de `busy` tombe-t-elle à moins de `gap` jours de `date` ?
pub(super) fn clashes(busy: &BTreeSet<NaiveDate>, date: NaiveDate, gap: i64) -> bool {
    let span = Duration::days(gap);
    let lo = date.checked_sub_signed(span).unwrap_or(NaiveDate::MIN);
    let hi = date.checked_add_signed(span).unwrap_or(NaiveDate::MAX);
    busy.range(lo..=hi).next().is_some()
}

/// Nombre maximal de jours tenables sur `days` jours avec un écart `gap`.
pub(super) fn capacity(days: u32, gap: u32) -> u32 {
    days.div_ceil(gap + 1)
}

pub(super) fn distance(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}
