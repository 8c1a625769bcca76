//! End-to-end tests for the work-break-timer CLI.
//!
//! These tests run the binary against a temporary preference file:
//! - status and history output
//! - settings show/set, including validation failures
//! - preference file selection via flag and environment
//! - shell completions

use std::fs;
use std::path::PathBuf;

use assert_cmd::{cargo_bin_cmd, Command};
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

fn timer() -> Command {
    let mut cmd = cargo_bin_cmd!("work-break-timer");
    cmd.env_remove("WORK_BREAK_TIMER_PREFS").env_remove("RUST_LOG");
    cmd
}

/// Creates a temp dir and the preference file path inside it.
fn prefs_path() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");
    (dir, path)
}

fn write_prefs(path: &PathBuf, json: &str) {
    fs::write(path, json).unwrap();
}

fn read_prefs(path: &PathBuf) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// status
// ============================================================================

mod status_tests {
    use super::*;

    #[test]
    fn test_status_with_empty_store() {
        let (_dir, path) = prefs_path();

        timer()
            .arg("--prefs")
            .arg(&path)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Rounds today: 0"))
            .stdout(predicate::str::contains("25:00"))
            .stdout(predicate::str::contains("05:00"));

        assert!(!path.exists());
    }

    #[test]
    fn test_status_counts_today() {
        let (_dir, path) = prefs_path();
        let today = chrono::Local::now().date_naive().format("%Y-%m-%d");
        write_prefs(
            &path,
            &format!(r#"{{"workRoundCount": ["2000-01-01,9", "{},4"]}}"#, today),
        );

        timer()
            .arg("--prefs")
            .arg(&path)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("Rounds today: 4"));
    }

    #[test]
    fn test_prefs_from_environment() {
        let (_dir, path) = prefs_path();
        write_prefs(&path, r#"{"workMinutes": 42}"#);

        timer()
            .env("WORK_BREAK_TIMER_PREFS", &path)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("42:00"));
    }

    #[test]
    fn test_corrupt_prefs_fail() {
        let (_dir, path) = prefs_path();
        write_prefs(&path, "{ not json");

        timer()
            .arg("--prefs")
            .arg(&path)
            .arg("status")
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Failed to open preferences"));
    }
}

// ============================================================================
// history
// ============================================================================

mod history_tests {
    use super::*;

    #[test]
    fn test_history_empty() {
        let (_dir, path) = prefs_path();

        timer()
            .arg("--prefs")
            .arg(&path)
            .arg("history")
            .assert()
            .success()
            .stdout(predicate::str::contains("No rounds recorded yet"));
    }

    #[test]
    fn test_history_limits_days_and_skips_malformed() {
        let (_dir, path) = prefs_path();
        write_prefs(
            &path,
            r#"{"workRoundCount": ["2024-01-01,3", "garbage", "2024-01-02,1", "2024-01-03,5"]}"#,
        );

        timer()
            .arg("--prefs")
            .arg(&path)
            .args(["history", "--days", "2"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2024-01-01").not())
            .stdout(predicate::str::contains("2024-01-02"))
            .stdout(predicate::str::contains("2024-01-03"))
            .stdout(predicate::str::contains("garbage").not());
    }
}

// ============================================================================
// settings
// ============================================================================

mod settings_tests {
    use super::*;

    #[test]
    fn test_show_defaults() {
        let (_dir, path) = prefs_path();

        timer()
            .arg("--prefs")
            .arg(&path)
            .args(["settings", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Work duration in minutes"))
            .stdout(predicate::str::contains("Force window focus in seconds"));
    }

    #[test]
    fn test_set_saves_values() {
        let (_dir, path) = prefs_path();

        timer()
            .arg("--prefs")
            .arg(&path)
            .args(["settings", "set", "--work", "50", "--break", "10"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Settings saved"));

        let prefs = read_prefs(&path);
        assert_eq!(prefs["workMinutes"], 50);
        assert_eq!(prefs["breakMinutes"], 10);
        assert_eq!(prefs["forceWindowFocusDuration"], 60);
    }

    #[test]
    fn test_set_keeps_round_log() {
        let (_dir, path) = prefs_path();
        write_prefs(&path, r#"{"workRoundCount": ["2024-01-01,3"]}"#);

        timer()
            .arg("--prefs")
            .arg(&path)
            .args(["settings", "set", "--focus", "0"])
            .assert()
            .success();

        let prefs = read_prefs(&path);
        assert_eq!(prefs["forceWindowFocusDuration"], 0);
        assert_eq!(prefs["workRoundCount"][0], "2024-01-01,3");
    }

    #[test]
    fn test_set_out_of_range_fails_without_saving() {
        let (_dir, path) = prefs_path();

        timer()
            .arg("--prefs")
            .arg(&path)
            .args(["settings", "set", "--work", "1000", "--break", "10"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("out of range (0-999)"));

        assert!(!path.exists());
    }

    #[test]
    fn test_set_negative_fails() {
        let (_dir, path) = prefs_path();

        timer()
            .arg("--prefs")
            .arg(&path)
            .args(["settings", "set", "--break", "-1"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("out of range"));
    }

    #[test]
    fn test_set_not_a_number_fails() {
        let (_dir, path) = prefs_path();

        timer()
            .arg("--prefs")
            .arg(&path)
            .args(["settings", "set", "--focus", "soon"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("is not a number"));
    }

    #[test]
    fn test_set_without_values_fails() {
        let (_dir, path) = prefs_path();

        timer()
            .arg("--prefs")
            .arg(&path)
            .args(["settings", "set"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Nothing to change"));
    }
}

// ============================================================================
// completions
// ============================================================================

mod completions_tests {
    use super::*;

    #[test]
    fn test_bash_completions() {
        timer()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("work-break-timer"));
    }
}
