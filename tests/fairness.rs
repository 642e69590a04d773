#![forbid(unsafe_code)]
use chrono::NaiveDate;
use roulement::fairness::fairness_score;
use roulement::scheduler::detect_conflicts;
use roulement::{
    AssignmentRecord, ConflictKind, DayProfile, DayType, Group, GroupId, Ledger, SchedError,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn rec(person: &str, date: NaiveDate, day_type: DayType, weight: f64) -> AssignmentRecord {
    AssignmentRecord::new(
        person,
        &GroupId::new("a"),
        &DayProfile {
            date,
            day_type,
            weight,
        },
    )
}

fn seeded() -> Ledger {
    Ledger::from_records(vec![
        rec("alice", d(2024, 3, 1), DayType::Friday, 1.2),
        rec("alice", d(2024, 3, 3), DayType::Weekend, 1.5),
        rec("alice", d(2024, 3, 30), DayType::LongWeekendMiddle, 2.5),
        rec("bob", d(2024, 3, 2), DayType::Weekend, 1.5),
        rec("bob", d(2024, 3, 4), DayType::Regular, 1.0),
    ])
    .unwrap()
}

#[test]
fn snapshot_counts_day_types() {
    let ledger = seeded();
    let alice = ledger.snapshot_for("alice", 2024);
    assert_eq!(alice.total_days, 3);
    assert_eq!(alice.friday_days, 1);
    assert_eq!(alice.weekend_days, 1);
    assert_eq!(alice.long_weekend_days, 1);
    assert_eq!(alice.regular_days, 0);
    assert!((alice.weighted_days - 5.2).abs() < 1e-9);
    assert_eq!(alice.last_assignment, Some(d(2024, 3, 30)));

    let nobody = ledger.snapshot_for("zoe", 2024);
    assert_eq!(nobody.total_days, 0);
    assert_eq!(nobody.last_assignment, None);
}

#[test]
fn cached_snapshot_matches_recomputation() {
    let mut ledger = seeded();
    ledger
        .append(vec![rec("bob", d(2024, 4, 1), DayType::Holiday, 2.0)])
        .unwrap();
    for name in ["alice", "bob"] {
        assert_eq!(ledger.snapshot_for(name, 2024), ledger.recompute(name, 2024));
    }
}

#[test]
fn years_are_kept_apart() {
    let mut ledger = seeded();
    ledger
        .append(vec![rec("alice", d(2025, 1, 2), DayType::Regular, 1.0)])
        .unwrap();
    assert_eq!(ledger.snapshot_for("alice", 2024).total_days, 3);
    assert_eq!(ledger.snapshot_for("alice", 2025).total_days, 1);

    let standings = ledger.standings_before(d(2025, 1, 10));
    assert_eq!(standings["alice"].total, 1);
    assert!(!standings.contains_key("bob"));
}

#[test]
fn standings_stop_strictly_before_the_date() {
    let standings = seeded().standings_before(d(2024, 3, 3));
    assert_eq!(standings["alice"].total, 1);
    assert!((standings["alice"].weighted - 1.2).abs() < 1e-9);
    assert_eq!(standings["bob"].total, 1);
}

#[test]
fn append_is_all_or_nothing() {
    let mut ledger = seeded();
    let before = ledger.len();

    let err = ledger
        .append(vec![
            rec("carol", d(2024, 3, 10), DayType::Weekend, 1.5),
            rec("alice", d(2024, 3, 3), DayType::Weekend, 1.5),
        ])
        .unwrap_err();
    match err {
        SchedError::LedgerConflict(c) => {
            assert_eq!(c.kind, ConflictKind::DoubleBooking);
            assert_eq!(c.person, "alice");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(ledger.len(), before);
    assert_eq!(ledger.snapshot_for("carol", 2024).total_days, 0);

    // jours consécutifs à l'intérieur du même lot
    let err = ledger
        .append(vec![
            rec("carol", d(2024, 3, 10), DayType::Weekend, 1.5),
            rec("carol", d(2024, 3, 11), DayType::Regular, 1.0),
        ])
        .unwrap_err();
    assert!(matches!(
        err,
        SchedError::LedgerConflict(c) if c.kind == ConflictKind::ConsecutiveDays
    ));
    assert_eq!(ledger.len(), before);
}

#[test]
fn raw_rows_are_checked_without_a_ledger() {
    let rows = vec![
        rec("alice", d(2024, 3, 1), DayType::Friday, 1.2),
        rec("alice", d(2024, 3, 2), DayType::Weekend, 1.5),
        rec("bob", d(2024, 3, 5), DayType::Regular, 1.0),
        rec("bob", d(2024, 3, 5), DayType::Regular, 1.0),
    ];
    let conflicts = detect_conflicts(&rows);
    assert_eq!(conflicts.len(), 2);
    assert_eq!(conflicts[0].kind, ConflictKind::ConsecutiveDays);
    assert_eq!(conflicts[1].kind, ConflictKind::DoubleBooking);
    assert!(Ledger::from_records(rows).is_err());
    assert!(seeded().conflicts().is_empty());
}

#[test]
fn equal_load_scores_one() {
    let ledger = Ledger::from_records(vec![
        rec("alice", d(2024, 3, 1), DayType::Regular, 1.0),
        rec("bob", d(2024, 3, 2), DayType::Regular, 1.0),
    ])
    .unwrap();
    let metrics = ledger.group_metrics(&Group::with_members("a", ["alice", "bob"]), 2024);
    assert_eq!(metrics.member_count, 2);
    assert_eq!(metrics.weighted_std_dev, 0.0);
    assert_eq!(metrics.max_total_diff, 0);
    for member in &metrics.members {
        let score = member.fairness_score.unwrap();
        assert_eq!(score.overall, 1.0);
    }
}

#[test]
fn dispersion_of_uneven_group() {
    let ledger = Ledger::from_records(vec![
        rec("alice", d(2024, 3, 4), DayType::Regular, 1.0),
        rec("bob", d(2024, 3, 5), DayType::Regular, 1.0),
        rec("bob", d(2024, 3, 9), DayType::Holiday, 2.0),
    ])
    .unwrap();
    let metrics = ledger.group_metrics(&Group::with_members("a", ["alice", "bob"]), 2024);
    assert!((metrics.average_weighted - 2.0).abs() < 1e-9);
    assert!((metrics.weighted_std_dev - 1.0).abs() < 1e-9);
    assert!((metrics.max_weighted_diff - 2.0).abs() < 1e-9);
    assert_eq!(metrics.max_total_diff, 1);

    for member in &metrics.members {
        let score = member.fairness_score.unwrap();
        for value in [score.regular, score.weighted, score.overall] {
            assert!((0.0..=1.0).contains(&value));
        }
    }
    let alice = ledger.person_fairness("alice", &["bob".to_string()], 2024);
    assert!((alice.weighted - 0.5).abs() < 1e-9);
}

#[test]
fn score_is_clamped_and_defined_for_empty_groups() {
    let far = fairness_score(10.0, 2.0, 30.0, 3.0);
    assert_eq!(far.regular, 0.0);
    assert_eq!(far.weighted, 0.0);

    let idle = fairness_score(0.0, 0.0, 0.0, 0.0);
    assert_eq!(idle.overall, 1.0);

    let metrics = Ledger::new().group_metrics(&Group::with_members("a", ["alice", "bob"]), 2024);
    assert_eq!(metrics.average_days, 0.0);
    assert!(metrics
        .members
        .iter()
        .all(|m| m.fairness_score.map(|s| s.overall) == Some(1.0)));
}

#[test]
fn reset_clears_everything() {
    let mut ledger = seeded();
    assert_eq!(ledger.reset(), 5);
    assert!(ledger.is_empty());
    assert_eq!(ledger.snapshot_for("alice", 2024).total_days, 0);
    assert!(ledger.standings_before(d(2024, 12, 31)).is_empty());
}
