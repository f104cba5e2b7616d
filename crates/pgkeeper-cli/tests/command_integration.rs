//! Integration tests for CLI commands that don't require a live monitor or
//! a real Postgres cluster.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn create_monitor_then_show_settings_round_trips() {
    let temp = TempDir::new().unwrap();
    let pgdata = temp.path().to_str().unwrap();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--pgdata", pgdata, "create", "monitor", "--port", "5433"])
        .assert()
        .success();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--pgdata", pgdata, "show", "settings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("monitor"));
}

#[test]
fn create_postgres_registers_monitor_and_group() {
    let temp = TempDir::new().unwrap();
    let pgdata = temp.path().to_str().unwrap();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args([
            "--pgdata",
            pgdata,
            "--monitor",
            "postgres://monitor.example.com:5432/pg_keeper",
            "--formation",
            "prod",
            "--group",
            "2",
            "create",
            "postgres",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("prod"));

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--pgdata", pgdata, "show", "settings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prod"));
}

#[test]
fn show_file_prints_paths_without_an_existing_config() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--pgdata", temp.path().to_str().unwrap(), "show", "file"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pg_keeper.cfg"));
}

#[test]
fn show_settings_without_a_config_file_fails() {
    let temp = TempDir::new().unwrap();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--pgdata", temp.path().to_str().unwrap(), "show", "settings"])
        .assert()
        .failure();
}

#[test]
fn no_pgdata_and_no_env_var_fails_with_bad_arguments_exit_code() {
    Command::cargo_bin("pg_keeper")
        .unwrap()
        .env_remove("PGDATA")
        .arg("show")
        .arg("settings")
        .assert()
        .failure()
        .code(12);
}

#[test]
fn run_fails_without_a_live_monitor_connection() {
    let temp = TempDir::new().unwrap();
    let pgdata = temp.path().to_str().unwrap();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args([
            "--pgdata",
            pgdata,
            "--monitor",
            "postgres://monitor.example.com:5432/pg_keeper",
            "create",
            "postgres",
        ])
        .assert()
        .success();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--pgdata", pgdata, "run"])
        .assert()
        .failure()
        .code(16);
}

#[test]
fn perform_failover_fails_without_a_live_monitor_connection() {
    let temp = TempDir::new().unwrap();
    let pgdata = temp.path().to_str().unwrap();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args([
            "--pgdata",
            pgdata,
            "--monitor",
            "postgres://monitor.example.com:5432/pg_keeper",
            "create",
            "postgres",
        ])
        .assert()
        .success();

    Command::cargo_bin("pg_keeper")
        .unwrap()
        .args(["--pgdata", pgdata, "perform", "failover"])
        .assert()
        .failure()
        .code(16);
}
