use super::{Conflict, ConflictKind};
use crate::model::AssignmentRecord;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Détecte doublons et jours consécutifs, tous groupes confondus.
pub fn detect_conflicts<'a, I>(records: I) -> Vec<Conflict>
where
    I: IntoIterator<Item = &'a AssignmentRecord>,
{
    let mut by_person: BTreeMap<&str, Vec<NaiveDate>> = BTreeMap::new();
    for record in records {
        by_person
            .entry(record.person.as_str())
            .or_default()
            .push(record.date);
    }

    let mut out = Vec::new();
    for (person, mut dates) in by_person {
        dates.sort();
        for pair in dates.windows(2) {
            let [a, b] = [pair[0], pair[1]];
            let kind = match (b - a).num_days() {
                0 => ConflictKind::DoubleBooking,
                1 => ConflictKind::ConsecutiveDays,
                _ => continue,
            };
            out.push(Conflict {
                person: person.to_string(),
                first: a,
                second: b,
                kind,
            });
        }
    }

    out
}
