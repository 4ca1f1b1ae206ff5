//! CLI integration tests for mongo-reconcile.
//!
//! These tests verify command-line argument parsing, help output, and exit
//! codes for configuration errors. None of them touch a live cluster:
//! configuration is validated before any connection is attempted.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a command for the mongo-reconcile binary.
fn cmd() -> Command {
    Command::cargo_bin("mongo-reconcile").unwrap()
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_flags() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--src"))
        .stdout(predicate::str::contains("--dest"))
        .stdout(predicate::str::contains("--comparison-mode"))
        .stdout(predicate::str::contains("--check-percent"))
        .stdout(predicate::str::contains("--continue-on-error"))
        .stdout(predicate::str::contains("--latest-size"))
        .stdout(predicate::str::contains("--full-scan-threshold"))
        .stdout(predicate::str::contains("--threads"))
        .stdout(predicate::str::contains("--batch-size"))
        .stdout(predicate::str::contains("--sample-version-threshold"));
}

#[test]
fn test_help_shows_defaults() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: sample]"))
        .stdout(predicate::str::contains("[default: 10000]"))
        .stdout(predicate::str::contains("[default: 1000]"))
        .stdout(predicate::str::contains("[default: 40]"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("mongo-reconcile"));
}

// =============================================================================
// Required Argument Tests
// =============================================================================

#[test]
fn test_missing_src_and_dest_fails() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--src"));
}

#[test]
fn test_missing_dest_fails() {
    cmd()
        .args(["--src", "mongodb://127.0.0.1:27017"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--dest"));
}

// =============================================================================
// Exit Code Tests - Config Errors (Exit Code 2)
// =============================================================================

#[test]
fn test_invalid_mode_exits_with_code_2() {
    cmd()
        .args([
            "--src",
            "mongodb://127.0.0.1:27017",
            "--dest",
            "mongodb://127.0.0.1:27018",
            "--comparison-mode",
            "everything",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("comparison mode"));
}

#[test]
fn test_out_of_range_percent_exits_with_code_2() {
    cmd()
        .args([
            "--src",
            "mongodb://127.0.0.1:27017",
            "--dest",
            "mongodb://127.0.0.1:27018",
            "--check-percent",
            "250",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("check_percent"));
}

#[test]
fn test_zero_threads_exits_with_code_2() {
    cmd()
        .args([
            "--src",
            "mongodb://127.0.0.1:27017",
            "--dest",
            "mongodb://127.0.0.1:27018",
            "--threads",
            "0",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("threads"));
}

#[test]
fn test_invalid_verbosity_exits_with_code_2() {
    cmd()
        .args([
            "--src",
            "mongodb://127.0.0.1:27017",
            "--dest",
            "mongodb://127.0.0.1:27018",
            "--verbosity",
            "chatty",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("verbosity"));
}

// =============================================================================
// Mode Spelling Tests
// =============================================================================

#[test]
fn test_original_mode_spellings_accepted() {
    // "no" and "all" are accepted aliases; both still fail later at
    // connection time (exit 3), not at config validation (exit 2).
    for mode in ["no", "all"] {
        cmd()
            .args([
                "--src",
                "mongodb://bad-host.invalid:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200",
                "--dest",
                "mongodb://bad-host.invalid:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200",
                "--comparison-mode",
                mode,
            ])
            .assert()
            .code(3);
    }
}
