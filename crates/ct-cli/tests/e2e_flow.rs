//! End-to-end tests driving the `ct` binary.
//!
//! Each test points `CT_HOME` at a fresh temp dir and passes explicit
//! `--time` values so results do not depend on the wall clock.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn ct_binary() -> String {
    env!("CARGO_BIN_EXE_ct").to_string()
}

/// Runs `ct` with an isolated environment.
fn ct(temp: &Path, args: &[&str]) -> Output {
    let home = temp.join("work");
    Command::new(ct_binary())
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .env("CT_HOME", &home)
        .env_remove("CT_NAME")
        .env_remove("CT_LOCATION")
        .env_remove("CT_ADIUM")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run ct")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "ct should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn init(temp: &Path) {
    let output = ct(temp, &["init", "--name", "alice", "--location", "desk"]);
    assert_success(&output);
}

#[test]
fn test_clockin_clockout_summary() {
    let temp = TempDir::new().unwrap();
    init(temp.path());

    let output = ct(temp.path(), &["clockin", "Proj", "A", "-t", "2020-01-01 09:00"]);
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        "Clocked into Proj A at 09:00 AM on Jan 01, 2020\n"
    );

    let output = ct(temp.path(), &["clockout", "-t", "2020-01-01 17:00"]);
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        "Clocked out of Proj A at 05:00 PM on Jan 01, 2020\n"
    );

    let log = fs::read_to_string(temp.path().join("work/alice.txt")).unwrap();
    assert_eq!(
        log,
        "Proj A clockin 01-01-2020 09:00:00\nclockout 01-01-2020 17:00:00\n"
    );

    let output = ct(
        temp.path(),
        &["summary", "--from", "2020-01-01", "--to", "2020-01-02"],
    );
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        "Proj A: 8 hours, 0 minutes\n\nTotal: 8 hours, 0 minutes\n"
    );
}

#[test]
fn test_clockout_twice_is_idempotent() {
    let temp = TempDir::new().unwrap();
    init(temp.path());

    assert_success(&ct(temp.path(), &["clockin", "A", "-t", "2020-01-01 09:00"]));
    assert_success(&ct(temp.path(), &["clockout", "-t", "2020-01-01 10:00"]));
    let log_path = temp.path().join("work/alice.txt");
    let before = fs::read(&log_path).unwrap();

    let output = ct(temp.path(), &["clockout", "-t", "2020-01-01 11:00"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "Not clocked into anything. Clockout failed.\n");
    assert_eq!(fs::read(&log_path).unwrap(), before);
}

#[test]
fn test_first_clockin_requires_project() {
    let temp = TempDir::new().unwrap();
    init(temp.path());

    let output = ct(temp.path(), &["clockin"]);
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        "You must specify a project for your first clockin.\n"
    );
    assert!(!temp.path().join("work/alice.txt").exists());
}

#[test]
fn test_summary_csv_has_header() {
    let temp = TempDir::new().unwrap();
    init(temp.path());

    assert_success(&ct(temp.path(), &["clockin", "A", "-t", "2020-01-01 09:00"]));
    assert_success(&ct(temp.path(), &["clockout", "-t", "2020-01-01 11:10"]));

    let output = ct(
        temp.path(),
        &["summary", "--format", "csv", "--from", "2020-01-01", "--to", "2020-01-02"],
    );
    assert_success(&output);
    assert_eq!(
        stdout(&output),
        "user,date,project,hours\nalice,2020-01-01,A,2.25\n"
    );
}

#[test]
fn test_corrupt_record_is_reported_not_fatal() {
    let temp = TempDir::new().unwrap();
    init(temp.path());
    fs::write(
        temp.path().join("work/bob.txt"),
        "clockout 01-01-2020 08:00:00\nB clockin 01-01-2020 09:00:00\nclockout 01-01-2020 09:30:00\n",
    )
    .unwrap();

    let output = ct(
        temp.path(),
        &["summary", "--from", "2020-01-01", "--to", "2020-01-02"],
    );
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.starts_with("B: 30 minutes\n\nTotal: 30 minutes\n"), "{out}");
    assert!(out.contains("Skipped 1 corrupt record"), "{out}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 1"));
}

#[test]
fn test_commands_fail_without_working_directory() {
    let temp = TempDir::new().unwrap();
    let output = Command::new(ct_binary())
        .env("HOME", temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join(".config"))
        .env("CT_HOME", temp.path().join("missing"))
        .env("CT_NAME", "alice")
        .args(["summary"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ct init"));
}

#[test]
fn test_status_reports_open_session() {
    let temp = TempDir::new().unwrap();
    init(temp.path());
    assert_success(&ct(temp.path(), &["clockin", "A", "-t", "2020-01-01 09:00"]));

    let output = ct(temp.path(), &["status", "--json"]);
    assert_success(&output);
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["state"], "clocked_in");
    assert_eq!(value["project"], "A");
    assert_eq!(value["since"], "2020-01-01T09:00:00");
}
