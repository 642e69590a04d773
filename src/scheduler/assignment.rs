use super::{
    util, AssignmentEngine, RunInput, SchedError, ScheduleOutcome, ScheduleWarning,
    UnresolvedSlot,
};
use crate::fairness::Standing;
use crate::model::{AssignmentRecord, DayProfile, Group, Person};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

pub(super) fn run(
    engine: &AssignmentEngine,
    input: &RunInput<'_>,
) -> Result<ScheduleOutcome, SchedError> {
    validate(input)?;

    let gap = engine.min_gap_days;
    let mut warnings = constraint_warnings(input, gap);
    let mut board = Board::new(input, i64::from(gap));
    let mut records = Vec::new();
    let mut unresolved = Vec::new();

    tracing::info!(
        period = %input.period,
        groups = input.groups.len(),
        days = input.profiles.len(),
        "generating schedule"
    );

    for (day_idx, profile) in input.profiles.iter().enumerate() {
        let next_day = input.profiles.get(day_idx + 1).map(|p| p.date);

        for (group_idx, group) in input.groups.iter().enumerate() {
            let ranked = board.ranked(group, profile.date);
            let Some(&fallback) = ranked.first() else {
                tracing::warn!(date = %profile.date, group = %group.id, "infeasible slot");
                unresolved.push(UnresolvedSlot {
                    date: profile.date,
                    group_id: group.id.clone(),
                });
                warnings.push(ScheduleWarning::InfeasibleSlot {
                    date: profile.date,
                    group_id: group.id.clone(),
                });
                continue;
            };

            // créneaux à venir encore pourvus : le reste du jour puis le lendemain
            let pending: Vec<(&Group, NaiveDate)> = input.groups[group_idx + 1..]
                .iter()
                .map(|g| (g, profile.date))
                .chain(
                    next_day
                        .into_iter()
                        .flat_map(|d| input.groups.iter().map(move |g| (g, d))),
                )
                .filter(|(g, d)| board.has_candidate(g, *d, None))
                .collect();

            let chosen = ranked
                .iter()
                .copied()
                .find(|name| {
                    pending
                        .iter()
                        .all(|(g, d)| board.has_candidate(g, *d, Some((*name, profile.date))))
                })
                .unwrap_or(fallback);

            tracing::debug!(date = %profile.date, group = %group.id, person = chosen, "assigned");
            board.commit(chosen, profile);
            records.push(AssignmentRecord::new(chosen, &group.id, profile));
        }
    }

    tracing::info!(
        period = %input.period,
        assigned = records.len(),
        unresolved = unresolved.len(),
        "schedule generated"
    );

    Ok(ScheduleOutcome {
        year: input.period.year,
        month: input.period.month,
        records,
        unresolved,
        warnings,
    })
}

fn validate(input: &RunInput<'_>) -> Result<(), SchedError> {
    if input.groups.is_empty() {
        return Err(SchedError::NoGroups);
    }
    for group in input.groups {
        let mut able = 0usize;
        for name in &group.members {
            let person = input
                .people
                .get(name)
                .ok_or_else(|| SchedError::UnknownPerson(name.clone()))?;
            if person.max_days_per_month != Some(0) {
                able += 1;
            }
        }
        if able == 0 {
            return Err(SchedError::InsufficientGroupMembers(group.id.clone()));
        }
    }
    Ok(())
}

fn constraint_warnings(input: &RunInput<'_>, gap: u32) -> Vec<ScheduleWarning> {
    let days = u32::try_from(input.profiles.len()).unwrap_or(u32::MAX);
    let capacity = util::capacity(days, gap);
    let names: BTreeSet<&str> = input
        .groups
        .iter()
        .flat_map(|g| g.members.iter().map(String::as_str))
        .collect();

    let mut out = Vec::new();
    for name in names {
        let Some(person) = input.people.get(name) else {
            continue;
        };
        let min = person.min_days_per_month;
        let reason = match person.max_days_per_month {
            Some(max) if min > max => Some(format!(
                "min_days_per_month ({min}) exceeds max_days_per_month ({max})"
            )),
            _ if min > capacity => Some(format!(
                "min_days_per_month ({min}) unreachable in {days} days with a gap of {gap}"
            )),
            _ => None,
        };
        if let Some(reason) = reason {
            tracing::warn!(person = name, %reason, "constraint conflict");
            out.push(ScheduleWarning::ConstraintConflict {
                person: name.to_string(),
                reason,
            });
        }
    }
    out
}

/// État courant d'une génération.
struct Board<'a> {
    people: &'a BTreeMap<String, Person>,
    standings: &'a BTreeMap<String, Standing>,
    gap: i64,
    busy: BTreeMap<&'a str, BTreeSet<NaiveDate>>,
    month_days: BTreeMap<&'a str, u32>,
    accrued: BTreeMap<&'a str, Standing>,
}

impl<'a> Board<'a> {
    fn new(input: &RunInput<'a>, gap: i64) -> Self {
        let mut busy: BTreeMap<&'a str, BTreeSet<NaiveDate>> = BTreeMap::new();
        let mut month_days: BTreeMap<&'a str, u32> = BTreeMap::new();
        let first = input.profiles.first().map(|p| p.date);
        let last = input.profiles.last().map(|p| p.date);

        for record in input.history {
            busy.entry(record.person.as_str())
                .or_default()
                .insert(record.date);
            let in_run = first.is_some_and(|f| f <= record.date)
                && last.is_some_and(|l| record.date <= l);
            if in_run {
                *month_days.entry(record.person.as_str()).or_default() += 1;
            }
        }

        Self {
            people: input.people,
            standings: input.standings,
            gap,
            busy,
            month_days,
            accrued: BTreeMap::new(),
        }
    }

    /// Disponibilité de `name` le jour `date`, éventuellement en supposant
    /// un choix provisoire `tentative` déjà fait.
    fn is_available(
        &self,
        name: &str,
        date: NaiveDate,
        tentative: Option<(&str, NaiveDate)>,
    ) -> bool {
        let Some(person) = self.people.get(name) else {
            return false;
        };
        let tentative = tentative.filter(|(who, _)| *who == name);

        let mut assigned = self.month_days.get(name).copied().unwrap_or(0);
        if tentative.is_some() {
            assigned += 1;
        }
        if person.reached_max(assigned) {
            return false;
        }

        if let Some((_, day)) = tentative {
            if util::distance(day, date) <= self.gap {
                return false;
            }
        }
        !self
            .busy
            .get(name)
            .is_some_and(|dates| util::clashes(dates, date, self.gap))
    }

    fn has_candidate(
        &self,
        group: &Group,
        date: NaiveDate,
        tentative: Option<(&str, NaiveDate)>,
    ) -> bool {
        group
            .members
            .iter()
            .any(|m| self.is_available(m, date, tentative))
    }

    /// Candidats éligibles, du plus prioritaire au moins prioritaire.
    fn ranked(&self, group: &'a Group, date: NaiveDate) -> Vec<&'a str> {
        let mut candidates: Vec<(Rank, &'a str)> = group
            .members
            .iter()
            .enumerate()
            .filter(|(_, name)| self.is_available(name, date, None))
            .map(|(position, name)| (self.rank(name, position), name.as_str()))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));
        candidates.into_iter().map(|(_, name)| name).collect()
    }

    fn rank(&self, name: &str, position: usize) -> Rank {
        let history = self.standings.get(name).copied().unwrap_or_default();
        let accrued = self.accrued.get(name).copied().unwrap_or_default();
        let month = self.month_days.get(name).copied().unwrap_or(0);
        let min = self.people.get(name).map_or(0, |p| p.min_days_per_month);
        Rank {
            below_min: month < min,
            weighted: history.weighted + accrued.weighted,
            total: history.total + accrued.total,
            position,
        }
    }

    fn commit(&mut self, name: &'a str, profile: &DayProfile) {
        self.busy.entry(name).or_default().insert(profile.date);
        *self.month_days.entry(name).or_default() += 1;
        let acc = self.accrued.entry(name).or_default();
        acc.weighted += profile.weight;
        acc.total += 1;
    }
}

/// Clé de tri : sous le minimum d'abord, puis charge pondérée, nombre de
/// jours et ordre d'inscription dans le groupe.
#[derive(Debug, Clone, Copy)]
struct Rank {
    below_min: bool,
    weighted: f64,
    total: u32,
    position: usize,
}

impl PartialEq for Rank {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rank {}

impl PartialOrd for Rank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rank {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .below_min
            .cmp(&self.below_min)
            .then_with(|| self.weighted.total_cmp(&other.weighted))
            .then_with(|| self.total.cmp(&other.total))
            .then_with(|| self.position.cmp(&other.position))
    }
}
