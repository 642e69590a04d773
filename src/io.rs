use crate::model::{AssignmentRecord, GroupId, Holiday, Person};
use crate::scheduler::ScheduleOutcome;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de fériés : header `start_date,end_date,name` (end_date et name optionnels)
pub fn import_holidays_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Holiday>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for (line, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let start = parse_date(rec.get(0).context("missing start_date")?)
            .with_context(|| format!("row {}: start_date", line + 1))?;
        let end = match rec.get(1).map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                parse_date(raw).with_context(|| format!("row {}: end_date", line + 1))?,
            ),
            None => None,
        };
        let name = rec
            .get(2)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let holiday =
            Holiday::new(start, end, name).with_context(|| format!("row {}", line + 1))?;
        out.push(holiday);
    }
    Ok(out)
}

/// Ligne de personnes importée avec ses groupes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonRow {
    pub person: Person,
    pub groups: Vec<GroupId>,
}

/// Import de personnes : header `name,min_days,max_days,groups` (groupes séparés par `;`)
pub fn import_people_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<PersonRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid people row (empty name)");
        }
        let min = match rec.get(1).map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<u32>()
                .with_context(|| format!("invalid min_days for {name}"))?,
            None => 0,
        };
        let max = match rec.get(2).map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<u32>()
                    .with_context(|| format!("invalid max_days for {name}"))?,
            ),
            None => None,
        };
        let groups = rec
            .get(3)
            .unwrap_or("")
            .split(';')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(GroupId::new)
            .collect();
        out.push(PersonRow {
            person: Person::new(name).with_limits(min, max),
            groups,
        });
    }
    Ok(out)
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

/// Export CSV : header `date,group_id,person,day_type,weight`
pub fn export_records_csv<P: AsRef<Path>>(
    path: P,
    records: &[AssignmentRecord],
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "group_id", "person", "day_type", "weight"])?;
    for r in records {
        let date = r.date.to_string();
        let weight = r.weight.to_string();
        w.write_record([
            date.as_str(),
            r.group_id.as_str(),
            r.person.as_str(),
            r.day_type.as_str(),
            weight.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export JSON du résultat d'une génération (jolie mise en forme)
pub fn export_outcome_json<P: AsRef<Path>>(
    path: P,
    outcome: &ScheduleOutcome,
) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(outcome)?;
    fs::write(path, s)?;
    Ok(())
}
