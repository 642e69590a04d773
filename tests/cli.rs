#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn cli(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("roulement-cli").unwrap();
    cmd.arg("--data").arg(data);
    cmd
}

const PEOPLE: &str = "name,min_days,max_days,groups
alice,,,a
bob,,,a
carol,,,a;b
dave,,,b
erin,,,b
";

#[test]
fn easter_weekend_is_shown_as_long_weekend() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");

    cli(&data)
        .args(["add-holiday", "--start", "2024-03-29", "--end", "2024-04-01", "--name", "Pâques"])
        .assert()
        .success();

    cli(&data)
        .args(["days", "--year", "2024", "--month", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-29 | holiday | 2.0"))
        .stdout(predicate::str::contains("2024-03-30 | long_weekend_middle | 2.5"))
        .stdout(predicate::str::contains("2024-03-28 | regular | 1.0"));

    cli(&data)
        .args(["days", "--year", "2024", "--month", "3", "--weight", "long_weekend_middle=3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-31 | long_weekend_middle | 3.0"));
}

#[test]
fn reversed_holiday_is_refused() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");
    cli(&data)
        .args(["add-holiday", "--start", "2024-05-02", "--end", "2024-05-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date range"));
    assert!(!data.exists());
}

#[test]
fn generate_then_check() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");
    let people = dir.path().join("people.csv");
    fs::write(&people, PEOPLE).unwrap();
    let out_csv = dir.path().join("mars.csv");

    cli(&data)
        .args(["import-people", "--csv"])
        .arg(&people)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 person(s) imported"));

    cli(&data)
        .args(["generate", "--year", "2024", "--month", "3", "--out-csv"])
        .arg(&out_csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-01 | a | alice | friday"))
        .stdout(predicate::str::contains("2024-03-01 | b | carol | friday"));

    let exported = fs::read_to_string(&out_csv).unwrap();
    assert!(exported.starts_with("date,group_id,person,day_type,weight"));
    assert_eq!(exported.lines().count(), 63);

    cli(&data)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));

    cli(&data)
        .args(["generate", "--year", "2024", "--month", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already has assignments"));

    cli(&data)
        .args(["fairness", "--year", "2024", "--group", "a"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"member_count\": 3"));
}

#[test]
fn dry_run_does_not_touch_history() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");
    let people = dir.path().join("people.csv");
    fs::write(&people, PEOPLE).unwrap();

    cli(&data).args(["import-people", "--csv"]).arg(&people).assert().success();
    cli(&data)
        .args(["generate", "--year", "2024", "--month", "4", "--dry-run"])
        .assert()
        .success();
    let saved = fs::read_to_string(&data).unwrap();
    assert!(saved.contains("\"history\": []"));
}

#[test]
fn incomplete_schedule_exits_with_warning_code() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");
    let people = dir.path().join("people.csv");
    fs::write(&people, "name,min_days,max_days,groups\nzoe,,,solo\n").unwrap();

    cli(&data).args(["import-people", "--csv"]).arg(&people).assert().success();
    cli(&data)
        .args(["generate", "--year", "2024", "--month", "2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("14 slot(s) left unassigned"));
}

#[test]
fn reset_requires_confirmation() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");

    cli(&data)
        .arg("reset-history")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    cli(&data)
        .args(["reset-history", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 assignment(s) removed"));
}

#[test]
fn rendered_profiles_snapshot() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");
    cli(&data)
        .args(["add-holiday", "--start", "2024-05-20", "--name", "Pentecôte"])
        .assert()
        .success();

    let out = cli(&data)
        .args(["days", "--year", "2024", "--month", "5"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(out.stdout).unwrap();
    let window: Vec<&str> = stdout.lines().skip(16).take(5).collect();
    insta::assert_snapshot!(window.join("\n"), @r"
    2024-05-17 | friday | 1.2
    2024-05-18 | weekend | 1.5
    2024-05-19 | long_weekend_middle | 2.5
    2024-05-20 | holiday | 2.0
    2024-05-21 | regular | 1.0
    ");
}

fn seeded(dir: &Path) -> std::path::PathBuf {
    let data = dir.join("data.json");
    let people = dir.join("people.csv");
    fs::write(&people, PEOPLE).unwrap();
    cli(&data).args(["import-people", "--csv"]).arg(&people).assert().success();
    data
}

#[test]
fn reset_recovers_from_inconsistent_history() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");
    fs::write(
        &data,
        r#"{
  "people": [{"name": "alice"}],
  "groups": [{"id": "a", "members": ["alice"]}],
  "history": [
    {"person": "alice", "group_id": "a", "date": "2024-03-01", "day_type": "friday", "weight": 1.2},
    {"person": "alice", "group_id": "a", "date": "2024-03-02", "day_type": "weekend", "weight": 1.5}
  ]
}"#,
    )
    .unwrap();

    cli(&data)
        .arg("check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("consecutive: alice"));

    cli(&data)
        .args(["reset-history", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 assignment(s) removed"));

    cli(&data)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no conflicts"));
    let saved = fs::read_to_string(&data).unwrap();
    assert!(saved.contains("\"alice\""));
}

#[test]
fn committed_month_can_be_read_back() {
    let dir = tempdir().unwrap();
    let data = seeded(dir.path());
    cli(&data)
        .args(["generate", "--year", "2024", "--month", "3"])
        .assert()
        .success();

    let out = cli(&data)
        .args(["schedule", "--year", "2024", "--month", "3"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 62);
    assert_eq!(lines[0], "2024-03-01 | a | alice | friday");
    assert_eq!(lines[1], "2024-03-01 | b | carol | friday");

    cli(&data)
        .args(["schedule", "--year", "2024", "--month", "4"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no assignment for 2024-04"));
}

#[test]
fn person_schedule_lists_own_days() {
    let dir = tempdir().unwrap();
    let data = seeded(dir.path());
    cli(&data)
        .args(["generate", "--year", "2024", "--month", "3"])
        .assert()
        .success();

    let out = cli(&data)
        .args(["person-schedule", "--person", "alice", "--year", "2024", "--month", "3"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with("2024-03-01 | a | friday"));
    let dates: Vec<&str> = stdout.lines().map(|l| &l[..10]).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
    assert!(dates.len() >= 9);

    cli(&data)
        .args(["person-schedule", "--person", "alice", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    cli(&data)
        .args(["person-schedule", "--person", "nobody"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown person"));
}

#[test]
fn groups_can_be_listed_and_edited() {
    let dir = tempdir().unwrap();
    let data = seeded(dir.path());

    cli(&data)
        .arg("groups")
        .assert()
        .success()
        .stdout(predicate::str::contains("a: alice, bob, carol"))
        .stdout(predicate::str::contains("b: carol, dave, erin"));

    cli(&data)
        .args(["remove-member", "--group", "a", "--person", "carol"])
        .assert()
        .success();
    cli(&data)
        .args(["remove-member", "--group", "a", "--person", "carol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a member"));
    cli(&data)
        .args(["remove-member", "--group", "zz", "--person", "carol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown group"));

    cli(&data)
        .args(["delete-group", "--id", "b"])
        .assert()
        .success();
    cli(&data)
        .args(["delete-group", "--id", "b"])
        .assert()
        .failure();

    cli(&data)
        .args(["add-group", "--id", "nuit"])
        .assert()
        .success();
    let out = cli(&data).arg("groups").output().unwrap();
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "a: alice, bob\nnuit: (empty)\n");
}

#[test]
fn holidays_can_be_listed_updated_and_deleted() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.json");
    for args in [
        ["--start", "2024-05-20", "--name", "Pentecôte"],
        ["--start", "2025-01-01", "--name", "Jour de l'an"],
    ] {
        cli(&data).arg("add-holiday").args(args).assert().success();
    }
    cli(&data)
        .args(["add-holiday", "--start", "2024-03-29", "--end", "2024-04-01", "--name", "Pâques"])
        .assert()
        .success();

    let list = |data: &Path| {
        let out = cli(data).args(["list-holidays", "--year", "2024"]).output().unwrap();
        String::from_utf8(out.stdout).unwrap()
    };

    let listed = list(&data);
    let lines: Vec<&str> = listed.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("| 2024-03-29 | 2024-04-01 | Pâques"));
    assert!(lines[1].ends_with("| 2024-05-20 | 2024-05-20 | Pentecôte"));
    let easter = lines[0].split(" | ").next().unwrap().to_string();

    cli(&data)
        .args(["update-holiday", "--id", easter.as_str()])
        .args(["--start", "2024-03-30", "--end", "2024-04-01"])
        .assert()
        .success();
    assert!(list(&data).contains("| 2024-03-30 | 2024-04-01 | Pâques"));

    cli(&data)
        .args(["update-holiday", "--id", easter.as_str()])
        .args(["--start", "2024-04-02", "--end", "2024-04-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date range"));

    cli(&data)
        .args(["delete-holiday", "--id", easter.as_str()])
        .assert()
        .success();
    assert_eq!(list(&data).lines().count(), 1);

    cli(&data)
        .args(["delete-holiday", "--id", easter.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown holiday"));
}
