//! Integration tests for the gridplay binary

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const BROKEN_LEVEL: &str = r#"{
  "name": "broken",
  "grid": {
    "nodes": {
      "generators": [{ "key": "gen1", "generation": 10 }],
      "loads": [{ "key": "load1", "load": 10 }]
    },
    "lines": {
      "regular": [
        { "key": "l1", "nodeFromKey": "gen1", "busFrom": 0, "nodeToKey": "sub9", "busTo": 1, "reactance": 0.1, "limit": 50 }
      ]
    }
  }
}"#;

#[test]
fn presets_lists_builtin_levels() {
    cargo_bin_cmd!("gridplay")
        .arg("presets")
        .assert()
        .success()
        .stdout(predicate::str::contains("sample-redispatched"))
        .stdout(predicate::str::contains("hvdc-tutorial"))
        .stdout(predicate::str::contains("hvdc-corridor"));
}

#[test]
fn solve_corridor_lists_link_and_tie_separately() {
    cargo_bin_cmd!("gridplay")
        .args(["solve", "--preset", "hvdc-corridor"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"cenl-n\s+cen-sub-1_bus1\s+ewl-sub-5_bus1\s+33\.55").unwrap())
        .stdout(predicate::str::contains("cenl-n_line_in"))
        .stdout(predicate::str::contains("1 of 1 island(s) solved, 0 line(s) overloaded"));
}

#[test]
fn solve_sample_flags_the_overloaded_line() {
    cargo_bin_cmd!("gridplay")
        .args(["solve", "--preset", "sample"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"line3\s+sub2_bus1\s+sub1_bus1\s+-114\.55.*OVERLOAD").unwrap())
        .stdout(predicate::str::contains("2 of 2 island(s) solved, 1 line(s) overloaded"));
}

#[test]
fn solve_json_reports_every_line() {
    let output = cargo_bin_cmd!("gridplay")
        .args(["solve", "--preset", "sample", "--format", "json", "--solver", "faer"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["solver"], "faer");
    assert_eq!(report["flows"].as_object().unwrap().len(), 12);
    assert_eq!(report["flows"]["line3"]["overloaded"], true);
    assert_eq!(report["islands"][0]["status"], "solved");
}

#[test]
fn action_file_can_unbalance_an_island() {
    let dir = tempdir().unwrap();
    let actions = dir.path().join("actions.yaml");
    fs::write(&actions, "- { kind: redispatch, nodeKey: load1, power: 150 }\n").unwrap();

    cargo_bin_cmd!("gridplay")
        .args(["solve", "--preset", "sample", "--action-file"])
        .arg(&actions)
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"line1\s+-\s+-\s+-\s+-\s+-\s+unsolved").unwrap())
        .stdout(predicate::str::contains("1 of 2 island(s) solved"));
}

#[test]
fn scenario_file_is_accepted_positionally() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("two-node.json");
    fs::write(
        &path,
        BROKEN_LEVEL.replace("\"sub9\", \"busTo\": 1", "\"load1\", \"busTo\": 0"),
    )
    .unwrap();

    cargo_bin_cmd!("gridplay")
        .arg("solve")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("DC power flow for broken"))
        .stdout(predicate::str::is_match(r"l1\s+gen1\s+load1\s+10\.00").unwrap());
}

#[test]
fn configuration_error_exits_non_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, BROKEN_LEVEL).unwrap();

    cargo_bin_cmd!("gridplay")
        .arg("solve")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("endpoint 'sub9' bus 1 does not match any node"));
}

#[test]
fn unknown_preset_is_an_error() {
    cargo_bin_cmd!("gridplay")
        .args(["balance", "--preset", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preset 'nowhere'"));
}

#[test]
fn balance_reports_net_injection() {
    cargo_bin_cmd!("gridplay")
        .args(["balance", "--preset", "sample"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generation : 200.00 MW"))
        .stdout(predicate::str::contains("Net        : +0.00 MW"));
}

#[test]
fn islands_shows_components() {
    cargo_bin_cmd!("gridplay")
        .args(["islands", "--preset", "hvdc-tutorial"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Components    : 1"))
        .stdout(predicate::str::contains("hvdc1_node_in"));
}

#[test]
fn log_output_stays_off_stdout() {
    let output = cargo_bin_cmd!("gridplay")
        .args(["--log-level", "debug", "solve", "--preset", "sample", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(serde_json::from_slice::<serde_json::Value>(&output.stdout).is_ok());
    assert!(!output.stderr.is_empty());
}
