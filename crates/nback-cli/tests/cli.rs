//! CLI command integration tests.
//! Each test uses a temp directory via NBACK_DATA_DIR for full isolation.

use std::process::Stdio;
use std::time::{Duration, Instant};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn nback_cmd(data_dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("nback").unwrap();
    cmd.env("NBACK_DATA_DIR", data_dir.path());
    cmd
}

#[test]
fn best_fresh_db() {
    let dir = TempDir::new().unwrap();
    nback_cmd(&dir)
        .arg("best")
        .assert()
        .success()
        .stdout(predicate::str::contains("no rounds recorded"));
}

#[test]
fn simulate_then_best() {
    let dir = TempDir::new().unwrap();
    nback_cmd(&dir)
        .args(["simulate", "--rounds", "2", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("round 1: level 2 ->"))
        .stdout(predicate::str::contains("round 2: level"))
        .stdout(predicate::str::contains("best level:"));

    nback_cmd(&dir)
        .arg("best")
        .assert()
        .success()
        .stdout(predicate::str::contains("best level:"));
}

#[test]
fn perfect_participant_climbs_one_level_per_round() {
    let dir = TempDir::new().unwrap();
    nback_cmd(&dir)
        .args([
            "simulate",
            "--rounds",
            "3",
            "--seed",
            "11",
            "--hit-rate",
            "1",
            "--false-alarm-rate",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("level 2 -> 3 (promote)"))
        .stdout(predicate::str::contains("level 3 -> 4 (promote)"))
        .stdout(predicate::str::contains("level 4 -> 5 (promote)"))
        .stdout(predicate::str::contains("best level: 5"));
}

#[test]
fn no_save_leaves_history_empty() {
    let dir = TempDir::new().unwrap();
    nback_cmd(&dir)
        .args(["simulate", "--seed", "1", "--no-save"])
        .assert()
        .success();

    nback_cmd(&dir)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("no rounds recorded"));
}

#[test]
fn history_json_is_newest_first() {
    let dir = TempDir::new().unwrap();
    nback_cmd(&dir)
        .args([
            "simulate",
            "--rounds",
            "3",
            "--seed",
            "5",
            "--hit-rate",
            "1",
            "--false-alarm-rate",
            "0",
        ])
        .assert()
        .success();

    let output = nback_cmd(&dir)
        .args(["history", "--json", "--limit", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rounds: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rounds = rounds.as_array().unwrap();
    assert_eq!(rounds.len(), 2);
    assert_eq!(rounds[0]["report"]["level"], 4);
    assert_eq!(rounds[1]["report"]["level"], 3);
}

#[test]
fn config_file_sets_round_length() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nback.toml");
    std::fs::write(&config, "trials_per_round = 5\n").unwrap();

    let output = nback_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .args(["simulate", "--seed", "3", "--json", "--no-save"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["trials"], 5);
}

#[test]
fn trials_flag_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nback.toml");
    std::fs::write(&config, "trials_per_round = 5\n").unwrap();

    let output = nback_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .args(["simulate", "--seed", "3", "--json", "--no-save", "--trials", "8"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["trials"], 8);
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nback.toml");
    std::fs::write(&config, "alphabet = []\n").unwrap();

    nback_cmd(&dir)
        .arg("--config")
        .arg(&config)
        .args(["simulate", "--no-save"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn out_of_range_hit_rate_fails() {
    let dir = TempDir::new().unwrap();
    nback_cmd(&dir)
        .args(["simulate", "--hit-rate", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hit rate"));
}

#[test]
fn play_stops_when_stdin_closes() {
    let dir = TempDir::new().unwrap();
    nback_cmd(&dir)
        .args(["play", "--seed", "2"])
        .write_stdin("")
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("[2-back] trial 1/20"))
        .stdout(predicate::str::contains("stopped."));

    // An abandoned round is not recorded.
    nback_cmd(&dir)
        .arg("best")
        .assert()
        .success()
        .stdout(predicate::str::contains("no rounds recorded"));
}

#[test]
fn play_quit_key_stops_round() {
    let dir = TempDir::new().unwrap();
    nback_cmd(&dir)
        .args(["play", "--no-save"])
        .write_stdin("l\nq\n")
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("stopped."));
}

/// Two perfect rounds: levels 2 -> 3 -> 4.
fn seed_two_rounds(dir: &TempDir) {
    nback_cmd(dir)
        .args([
            "simulate",
            "--rounds",
            "2",
            "--seed",
            "9",
            "--hit-rate",
            "1",
            "--false-alarm-rate",
            "0",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("level 3 -> 4 (promote)"));
}

fn round_count(dir: &TempDir) -> usize {
    let output = nback_cmd(dir)
        .args(["history", "--json", "--limit", "100"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rounds: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    rounds.as_array().unwrap().len()
}

#[test]
fn play_resume_starts_at_last_level() {
    let dir = TempDir::new().unwrap();
    seed_two_rounds(&dir);

    nback_cmd(&dir)
        .args(["play", "--resume", "--seed", "4"])
        .write_stdin("")
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("dual 4-back"))
        .stdout(predicate::str::contains("[4-back] trial 1/20"));
}

#[test]
fn play_resume_without_a_history_uses_initial_level() {
    let dir = TempDir::new().unwrap();
    nback_cmd(&dir)
        .args(["play", "--resume"])
        .write_stdin("")
        .timeout(Duration::from_secs(10))
        .assert()
        .success()
        .stdout(predicate::str::contains("dual 2-back"));
}

#[test]
fn play_resume_no_save_records_nothing() {
    let dir = TempDir::new().unwrap();
    seed_two_rounds(&dir);
    assert_eq!(round_count(&dir), 2);

    // Stdin stays open so the round runs to completion instead of stopping.
    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin!("nback"))
        .args([
            "play",
            "--resume",
            "--no-save",
            "--trials",
            "2",
            "--interval-ms",
            "10",
            "--seed",
            "1",
        ])
        .env("NBACK_DATA_DIR", dir.path())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn nback play");
    let stdin = child.stdin.take();

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        assert!(Instant::now() < deadline, "play did not finish its round");
        std::thread::sleep(Duration::from_millis(20));
    };
    drop(stdin);
    assert!(status.success());

    let output = child.wait_with_output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("round 1: level 4 ->"), "{stdout}");
    assert!(!stdout.contains("stopped."), "{stdout}");

    assert_eq!(round_count(&dir), 2, "--no-save round was recorded");
}
