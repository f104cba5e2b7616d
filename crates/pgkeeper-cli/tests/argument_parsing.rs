//! Focused CLI argument parsing tests.
//!
//! Tests that verify command-line argument parsing works correctly without
//! requiring a live monitor connection or a real Postgres cluster.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn version_flag_shows_version() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pg_keeper"));
}

#[test]
fn help_flag_shows_usage() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn no_command_fails_with_usage() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn create_postgres_requires_monitor() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--pgdata", temp.path().to_str().unwrap(), "create", "postgres"])
        .assert()
        .failure();
}

#[test]
fn create_monitor_succeeds_and_writes_config_file() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--pgdata", temp.path().to_str().unwrap(), "create", "monitor"])
        .assert()
        .success();
}

#[test]
fn drop_requires_node_subcommand() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .arg("drop")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn perform_promotion_requires_name() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["perform", "promotion"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn unrecognized_command_shows_error() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .arg("not-a-real-verb")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized"));
}

#[test]
fn unrecognized_create_target_shows_error() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["create", "not-a-target"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized"));
}

#[test]
fn show_help_lists_subcommands() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["show", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("state"))
        .stdout(predicate::str::contains("events"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn perform_help_lists_subcommands() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["perform", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failover"))
        .stdout(predicate::str::contains("switchover"))
        .stdout(predicate::str::contains("promotion"));
}

#[test]
fn json_flag_is_accepted() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--json", "--help"])
        .assert()
        .success();
}

#[test]
fn verbose_and_quiet_flags_are_accepted() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--verbose", "--help"])
        .assert()
        .success();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--quiet", "--help"])
        .assert()
        .success();
}

#[test]
fn events_count_accepts_integer() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["show", "events", "--count", "5", "--help"])
        .assert()
        .success();
}

#[test]
fn events_count_rejects_non_integer() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args([
            "--pgdata",
            temp.path().to_str().unwrap(),
            "show",
            "events",
            "--count",
            "not-a-number",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid"));
}
