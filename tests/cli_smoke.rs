//! Smoke tests for the demo CLI binary over stdin/stdout (spec §1 harness).

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn status_reports_uninitialised_on_a_fresh_vault() {
    Command::cargo_bin("passkey-vault")
        .unwrap()
        .write_stdin("status\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("uninitialised"));
}

#[test]
fn setup_then_status_reports_unlocked() {
    Command::cargo_bin("passkey-vault")
        .unwrap()
        .write_stdin("setup alice phone\nstatus\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("created and unlocked"))
        .stdout(predicate::str::contains("unlocked"));
}

#[test]
fn add_password_then_list_shows_the_item() {
    Command::cargo_bin("passkey-vault")
        .unwrap()
        .write_stdin("setup alice phone\nadd-password github hunter2\nlist\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("github"));
}

#[test]
fn locking_then_listing_fails_with_usage_exit_code() {
    Command::cargo_bin("passkey-vault")
        .unwrap()
        .write_stdin("setup alice phone\nlock\nlist\nexit\n")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("vault is locked"));
}

#[test]
fn generate_prints_a_password_of_the_requested_length() {
    Command::cargo_bin("passkey-vault")
        .unwrap()
        .write_stdin("generate --length 16\nexit\n")
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| {
            out.lines().any(|line| {
                line.strip_prefix("passkey-vault> ")
                    .map(|rest| rest.chars().count() == 16)
                    .unwrap_or(false)
            })
        }));
}
