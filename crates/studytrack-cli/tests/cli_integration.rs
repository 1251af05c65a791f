//! CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data directory.

mod common;

use common::{run_cli, run_failure, run_json};

#[test]
fn subject_list_seeds_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let subjects = run_json(dir.path(), &["subject", "list"]);
    let ids: Vec<_> = subjects
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["physics", "chemistry", "biology", "math"]);
    assert!(dir.path().join("studytrack.db").exists());
}

#[test]
fn subject_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let added = run_json(dir.path(), &["subject", "add", "Organic Chemistry", "--color", "study-green"]);
    let id = added["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("organic-chemistry-"));
    assert_eq!(added["color"], "study-green");

    let updated = run_json(dir.path(), &["subject", "update", &id, "Orgo"]);
    assert_eq!(updated["name"], "Orgo");
    assert_eq!(updated["color"], "study-green");

    run_json(dir.path(), &["subject", "delete", &id]);
    let subjects = run_json(dir.path(), &["subject", "list"]);
    assert_eq!(subjects.as_array().unwrap().len(), 4);

    // Stale ids are a no-op, not a failure.
    let stale = run_json(dir.path(), &["subject", "update", &id, "Again"]);
    assert!(stale.is_null());
    let subjects = run_json(dir.path(), &["subject", "list"]);
    assert!(subjects.as_array().unwrap().iter().all(|s| s["name"] != "Again"));
}

#[test]
fn empty_subject_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let stderr = run_failure(dir.path(), &["subject", "add", "   "]);
    assert!(stderr.starts_with("error:"));
}

#[test]
fn recording_updates_totals_streak_and_goals() {
    let dir = tempfile::tempdir().unwrap();
    let goal = run_json(dir.path(), &["goal", "add", "math", "1"]);
    let goal_id = goal["goal"]["id"].as_str().unwrap().to_string();

    let session = run_json(dir.path(), &["session", "record", "math", "45"]);
    assert_eq!(session["subjectId"], "math");
    assert_eq!(session["durationMinutes"], 45);
    run_json(dir.path(), &["session", "record", "physics", "20"]);

    let summary = run_json(dir.path(), &["stats", "summary"]);
    assert_eq!(summary["totalStudyMinutes"], 65);
    assert_eq!(summary["streak"], 1);
    assert!(summary["lastStudyDay"].is_string());

    let total = run_json(dir.path(), &["subject", "total", "math"]);
    assert_eq!(total["totalMinutes"], 45);
    assert_eq!(total["formatted"], "00:45:00");

    let window = run_json(dir.path(), &["stats", "window", "--subject", "math"]);
    assert_eq!(window["windowDays"], 7);
    assert_eq!(window["stats"]["totalMinutes"], 45);
    assert_eq!(window["stats"]["sessionsCount"], 1);

    let goals = run_json(dir.path(), &["goal", "list"]);
    assert_eq!(goals[0]["goal"]["id"], goal_id.as_str());
    assert_eq!(goals[0]["goal"]["completedMinutes"], 45);
    assert_eq!(goals[0]["progressPct"], 75.0);
    assert_eq!(goals[0]["complete"], false);
}

#[test]
fn invalid_session_durations_fail_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    run_failure(dir.path(), &["session", "record", "math", "0"]);
    run_failure(dir.path(), &["session", "record", "math", "-5"]);

    let sessions = run_json(dir.path(), &["session", "list"]);
    assert!(sessions.as_array().unwrap().is_empty());
    let summary = run_json(dir.path(), &["stats", "summary"]);
    assert_eq!(summary["totalStudyMinutes"], 0);
    assert_eq!(summary["streak"], 0);
}

#[test]
fn breakdowns_and_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    run_json(dir.path(), &["session", "record", "biology", "30"]);
    run_json(dir.path(), &["session", "record", "math", "10"]);

    let daily = run_json(dir.path(), &["stats", "daily", "--days", "3"]);
    let daily = daily.as_array().unwrap();
    assert_eq!(daily.len(), 3);
    assert_eq!(daily[2]["minutes"], 40);

    let weekly = run_json(dir.path(), &["stats", "weekly", "--weeks", "2"]);
    assert_eq!(weekly.as_array().unwrap().len(), 2);
    assert_eq!(weekly[1]["minutes"], 40);

    let subjects = run_json(dir.path(), &["stats", "subjects"]);
    assert_eq!(subjects[0]["subjectId"], "biology");
    assert_eq!(subjects[1]["subjectId"], "math");

    let rebuilt = run_json(dir.path(), &["stats", "rebuild"]);
    assert_eq!(rebuilt["totalStudyMinutes"], 40);
    assert_eq!(rebuilt["streak"], 1);
}

#[test]
fn deleting_missing_goal_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let goal = run_json(dir.path(), &["goal", "add", "math", "2", "--weekly"]);
    let goal_id = goal["goal"]["id"].as_str().unwrap().to_string();

    let missing = run_json(dir.path(), &["goal", "delete", "nope"]);
    assert_eq!(missing["found"], false);
    assert_eq!(run_json(dir.path(), &["goal", "list"]).as_array().unwrap().len(), 1);

    let deleted = run_json(dir.path(), &["goal", "delete", &goal_id]);
    assert_eq!(deleted["found"], true);
    assert!(run_json(dir.path(), &["goal", "list"]).as_array().unwrap().is_empty());
}

#[test]
fn oversized_breakdowns_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    run_failure(dir.path(), &["stats", "daily", "--days", "4294967295"]);
    run_failure(dir.path(), &["stats", "weekly", "--weeks", "0"]);
    let days = run_json(dir.path(), &["stats", "daily", "--days", "3660"]);
    assert_eq!(days.as_array().unwrap().len(), 3660);
}

#[test]
fn config_roundtrip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.focus_minutes"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");

    run_json(dir.path(), &["config", "set", "stats.default_window_days", "30"]);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "stats.default_window_days"]);
    assert_eq!(stdout.trim(), "30");

    let window = run_json(dir.path(), &["stats", "window"]);
    assert_eq!(window["windowDays"], 30);

    run_failure(dir.path(), &["config", "set", "timer.focus_minutes", "0"]);
    run_failure(dir.path(), &["config", "get", "timer.nope"]);

    let reset = run_json(dir.path(), &["config", "reset"]);
    assert_eq!(reset["stats"]["default_window_days"], 7);
}

#[test]
fn focus_timer_without_subject_fails() {
    let dir = tempfile::tempdir().unwrap();
    let stderr = run_failure(dir.path(), &["timer", "run", "--minutes", "1"]);
    assert!(stderr.starts_with("error:"));
    let sessions = run_json(dir.path(), &["session", "list"]);
    assert!(sessions.as_array().unwrap().is_empty());
}
