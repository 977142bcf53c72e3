//! End-to-end tests for the fuzzy-lookup binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("left.csv"), "Id,Name\n1,Alpha Beta\n2,Gamma\n3,Alpha Beta\n").unwrap();
    std::fs::write(dir.path().join("right.csv"), "Company\nBeta Alpha\nDelta\n").unwrap();
    dir
}

fn fuzzy_lookup(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fuzzy-lookup").unwrap();
    cmd.current_dir(dir)
        .env_remove("FUZZY_LOOKUP_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

fn scenario(dir: &Path) -> Command {
    let mut cmd = fuzzy_lookup(dir);
    cmd.args([
        "--source",
        "left.csv",
        "--source-column",
        "Name",
        "--target",
        "right.csv",
        "--threshold",
        "80",
        "--limit",
        "5",
    ]);
    cmd
}

#[test]
fn writes_default_output_file() {
    let dir = workspace();
    scenario(dir.path()).arg("--quiet").assert().success();

    let written = std::fs::read_to_string(dir.path().join("fuzzy_match_output.csv")).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines,
        vec![
            ",\"left.csv,Name\",\"right.csv,Company\",Score",
            "0,Alpha Beta,Beta Alpha,100",
        ]
    );
}

#[test]
fn writes_to_stdout_without_index() {
    let dir = workspace();
    scenario(dir.path())
        .args(["--output", "-", "--no-index", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alpha Beta,Beta Alpha,100"))
        .stdout(predicate::str::contains("Gamma").not());
}

#[test]
fn prints_status_summary() {
    let dir = workspace();
    scenario(dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 match written to fuzzy_match_output.csv"))
        .stderr(predicate::str::contains("4 pairs scored"));
}

#[test]
fn json_summary() {
    let dir = workspace();
    let output = scenario(dir.path())
        .args(["--format", "json", "--output", "matches.csv"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["stats"]["pairs_total"], 4);
    assert_eq!(summary["stats"]["pairs_kept"], 1);
    assert_eq!(summary["source"]["values"], 2);
    assert_eq!(summary["target"]["label"], "right.csv,Company");
    assert!(dir.path().join("matches.csv").exists());
}

#[test]
fn json_cannot_share_stdout() {
    let dir = workspace();
    scenario(dir.path())
        .args(["--format", "json", "--output", "-"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("VALIDATION_ERROR"));
}

#[test]
fn rejects_threshold_above_100() {
    let dir = workspace();
    fuzzy_lookup(dir.path())
        .args(["-s", "left.csv", "-t", "right.csv", "--threshold", "101"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("threshold"));
    assert!(!dir.path().join("fuzzy_match_output.csv").exists());
}

#[test]
fn rejects_zero_limit() {
    let dir = workspace();
    fuzzy_lookup(dir.path())
        .args(["-s", "left.csv", "-t", "right.csv", "--limit", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn empty_source_column() {
    let dir = workspace();
    std::fs::write(dir.path().join("empty.csv"), "Name\n  \n").unwrap();
    fuzzy_lookup(dir.path())
        .args(["-s", "empty.csv", "-t", "right.csv"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Empty input"));
}

#[test]
fn unknown_column() {
    let dir = workspace();
    fuzzy_lookup(dir.path())
        .args(["-s", "left.csv", "--source-column", "Title", "-t", "right.csv"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Id, Name"));
}

#[test]
fn missing_input_file() {
    let dir = workspace();
    fuzzy_lookup(dir.path())
        .args(["-s", "nope.csv", "-t", "right.csv"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn missing_paths_are_a_config_error() {
    let dir = workspace();
    fuzzy_lookup(dir.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("input.source.path"));
}

#[test]
fn explicit_config_must_exist() {
    let dir = workspace();
    fuzzy_lookup(dir.path())
        .args(["--config", "missing.toml"])
        .assert()
        .code(3);
}

#[test]
fn discovers_config_file() {
    let dir = workspace();
    std::fs::write(
        dir.path().join(".fuzzy-lookup.toml"),
        r#"
[input.source]
path = "left.csv"
column = "Name"

[input.target]
path = "right.csv"

[matching]
threshold = 0
limit = 1

[output]
path = "-"
index = false
"#,
    )
    .unwrap();

    let output = fuzzy_lookup(dir.path()).arg("--quiet").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    // header plus one row per distinct source value
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.contains("Alpha Beta,Beta Alpha,100"));
}

#[test]
fn flags_override_config_file() {
    let dir = workspace();
    std::fs::write(
        dir.path().join("fuzzy-lookup.toml"),
        "[input.source]\npath = \"left.csv\"\ncolumn = \"Name\"\n\n[input.target]\npath = \"right.csv\"\n\n[matching]\nthreshold = 0\n",
    )
    .unwrap();

    fuzzy_lookup(dir.path())
        .args(["--threshold", "100", "--output", "-", "--no-index", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Delta").not())
        .stdout(predicate::str::contains("Alpha Beta,Beta Alpha,100"));
}
