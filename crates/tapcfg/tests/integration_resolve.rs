//! Integration tests for the tapcfg binary

use assert_cmd::cargo;
use predicates::str::{contains, is_empty};
use std::fs;
use tempfile::TempDir;

/// Run in an empty working directory with no inherited TAP_* variables
fn tapcfg(temp_dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo::cargo_bin_cmd!("tapcfg");
    cmd.env_clear().current_dir(temp_dir.path());
    cmd
}

fn resolve_json(temp_dir: &TempDir, tokens: &[&str]) -> serde_json::Value {
    let output = tapcfg(temp_dir)
        .arg("resolve")
        .arg("--")
        .args(tokens)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help_lists_sections() {
    let temp_dir = TempDir::new().unwrap();
    tapcfg(&temp_dir)
        .arg("help")
        .assert()
        .success()
        .stdout(contains("Usage:"))
        .stdout(contains("Basic Options:"))
        .stdout(contains("-R<type> --reporter=<type>"))
        .stdout(contains("Environment Variables:"));
}

#[test]
fn test_resolve_combined_short_flags() {
    let temp_dir = TempDir::new().unwrap();
    let json = resolve_json(&temp_dir, &["-bCRspec", "test/a.js"]);

    assert_eq!(json["config"]["bail"], true);
    assert_eq!(json["config"]["color"], false);
    assert_eq!(json["config"]["reporter"], "spec");
    assert_eq!(json["config"]["timeout"].as_f64(), Some(30.0));
    assert_eq!(json["positionals"], serde_json::json!(["test/a.js"]));
    assert_eq!(json["diagnostics"], serde_json::json!([]));
}

#[test]
fn test_resolve_reads_rc_file_and_environment() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".taprc"), "reporter: dot\ntimeout: 60\n").unwrap();

    let output = tapcfg(&temp_dir)
        .env("TAP_TIMEOUT", "7")
        .env("TAP_BAIL", "1")
        .args(["resolve", "--"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(json["config"]["reporter"], "dot");
    assert_eq!(json["config"]["timeout"].as_f64(), Some(60.0));
    assert_eq!(json["config"]["bail"], true);
    assert!(json["rcFile"].as_str().unwrap().ends_with(".taprc"));
}

#[test]
fn test_fatal_diagnostic_exits_non_zero() {
    let temp_dir = TempDir::new().unwrap();
    tapcfg(&temp_dir)
        .args(["resolve", "--", "--branches=150"])
        .assert()
        .failure()
        .stdout(is_empty())
        .stderr(contains("out of range"))
        .stderr(contains("Error:"));
}

#[test]
fn test_resolve_lists_environment_exports() {
    let temp_dir = TempDir::new().unwrap();
    let json = resolve_json(&temp_dir, &["-b", "--grep=a", "--grep=b", "-t", "12"]);

    assert_eq!(json["env"]["TAP_BAIL"], "1");
    assert_eq!(json["env"]["TAP_GREP"], "a\nb");
    assert_eq!(json["env"]["TAP_TIMEOUT"], "12");
    assert_eq!(json["env"]["TAP_ONLY"], "0");
}

#[test]
fn test_lenient_allows_invalid_values() {
    let temp_dir = TempDir::new().unwrap();
    tapcfg(&temp_dir)
        .args(["resolve", "--lenient", "--", "--branches=150"])
        .assert()
        .success()
        .stderr(contains("warning:"));
}

#[test]
fn test_unknown_option_warns_unless_strict() {
    let temp_dir = TempDir::new().unwrap();
    tapcfg(&temp_dir)
        .args(["resolve", "--", "--frobnicate"])
        .assert()
        .success()
        .stderr(contains("unknown option '--frobnicate'"));

    tapcfg(&temp_dir)
        .args(["resolve", "--strict", "--", "--frobnicate"])
        .assert()
        .failure();
}

#[test]
fn test_resolved_help_flag_prints_help() {
    let temp_dir = TempDir::new().unwrap();
    tapcfg(&temp_dir)
        .args(["resolve", "--", "-h"])
        .assert()
        .success()
        .stdout(contains("Coverage Enforcement Options:"));
}

#[test]
fn test_dump_config_flag_prints_yaml() {
    let temp_dir = TempDir::new().unwrap();
    tapcfg(&temp_dir)
        .args(["resolve", "--", "--dump-config", "-T"])
        .assert()
        .success()
        .stdout(contains("timeout: 0\n"))
        .stdout(contains("dump-config: true\n"));
}

#[test]
fn test_dump_round_trips_through_rc_file() {
    let first = TempDir::new().unwrap();
    let output = tapcfg(&first)
        .args(["dump", "--", "-R", "tap", "--node-arg=--expose-gc", "--lines=90"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let second = TempDir::new().unwrap();
    fs::write(second.path().join(".taprc"), &output.stdout).unwrap();
    let reloaded = tapcfg(&second).arg("dump").output().unwrap();
    assert!(reloaded.status.success());
    assert_eq!(
        String::from_utf8_lossy(&reloaded.stdout),
        String::from_utf8_lossy(&output.stdout)
    );
}

#[test]
fn test_unparsable_rc_file_aborts() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join(".taprc"), "reporter: [oops\n").unwrap();
    tapcfg(&temp_dir)
        .args(["resolve", "--"])
        .assert()
        .failure()
        .stderr(contains("Failed to parse rc file"));
}
