use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn sample_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("bench/bench.yaml")
}

#[test]
fn validate_only_accepts_the_sample_config() {
    Command::cargo_bin("hanabi-bench")
        .expect("binary built")
        .arg("--config")
        .arg(sample_config())
        .arg("--validate-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded configuration 'omniscient_baseline'"))
        .stdout(predicate::str::contains("Validation-only mode"));
}

#[test]
fn overrides_are_validated() {
    Command::cargo_bin("hanabi-bench")
        .expect("binary built")
        .arg("--config")
        .arg(sample_config())
        .args(["--players", "6", "--validate-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rules"));
}

#[test]
fn missing_config_fails() {
    Command::cargo_bin("hanabi-bench")
        .expect("binary built")
        .args(["--config", "does/not/exist.yaml", "--validate-only"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config"));
}

#[test]
fn small_run_writes_every_artifact() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("out");
    let config_path = dir.path().join("bench.yaml");
    let yaml = fs::read_to_string(sample_config())
        .expect("sample config readable")
        .replace("bench/out/{run_id}", &out.display().to_string())
        .replace("enable_structured: false", "enable_structured: true");
    fs::write(&config_path, yaml).expect("write config");

    Command::cargo_bin("hanabi-bench")
        .expect("binary built")
        .arg("--config")
        .arg(&config_path)
        .args(["--trials", "3", "--players", "3", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("→ 9 rows"));

    let rows = fs::read_to_string(out.join("trials.jsonl")).expect("jsonl written");
    assert_eq!(rows.lines().count(), 9);
    assert!(out.join("summary.md").exists());
    assert!(out.join("telemetry.jsonl").exists());

    let telemetry: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.join("telemetry_summary.json")).expect("telemetry summary written"),
    )
    .expect("telemetry summary is JSON");
    assert!(telemetry["decisions"]["count"].as_u64().expect("decision count") > 0);
    assert_eq!(telemetry["games"]["terminated"].as_u64(), Some(9));
    let reasons = telemetry["decisions"]["reasons_by_policy"]
        .as_object()
        .expect("reasons by policy");
    assert!(reasons.contains_key("heuristic"));
    assert!(reasons.contains_key("blind"));
}
