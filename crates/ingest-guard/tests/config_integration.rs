//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! from an end-to-end perspective using the compiled binary. Tests use
//! `info --json` to assert actual config values, not just process success.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env_remove("INGEST_GUARD_MAX_INPUT_BYTES")
        .env_remove("INGEST_GUARD_MAX_INPUT_LINES")
        .env_remove("INGEST_GUARD_LOG_LEVEL");
    cmd
}

/// Run `info --json` from a directory and parse the JSON output.
fn info_json(dir: &std::path::Path) -> Value {
    let output = cmd()
        .args(["-C", dir.to_str().unwrap(), "info", "--json"])
        .output()
        .expect("failed to run command");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("invalid JSON output")
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    let tmp = TempDir::new().unwrap();
    let json = info_json(tmp.path());

    assert_eq!(json["config"]["log_level"], "info");
    assert!(json["config"]["config_file"].is_null());
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".ingest-guard.toml"), "max_input_lines = 10\n").unwrap();

    let json = info_json(tmp.path());

    assert_eq!(json["config"]["max_input_lines"], 10);
    let reported = json["config"]["config_file"].as_str().unwrap();
    assert!(
        reported.ends_with(".ingest-guard.toml"),
        "should report dotfile: {reported}"
    );
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let child = tmp.path().join("a").join("b");
    fs::create_dir_all(&child).unwrap();
    fs::write(tmp.path().join("ingest-guard.toml"), "max_input_bytes = 2048\n").unwrap();

    let json = info_json(&child);

    assert_eq!(json["config"]["max_input_bytes"], 2048);
}

#[test]
fn parses_yaml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("ingest-guard.yaml"),
        "max_input_bytes: 512\nmax_input_lines: 8\n",
    )
    .unwrap();

    let json = info_json(tmp.path());

    assert_eq!(json["config"]["max_input_bytes"], 512);
    assert_eq!(json["config"]["max_input_lines"], 8);
}

#[test]
fn parses_json_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("ingest-guard.json"),
        r#"{"log_level": "warn"}"#,
    )
    .unwrap();

    let json = info_json(tmp.path());

    assert_eq!(json["config"]["log_level"], "warn");
}

#[test]
fn explicit_config_overrides_discovered() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("ingest-guard.toml"), "max_input_bytes = 100\n").unwrap();
    let explicit = tmp.path().join("explicit.toml");
    fs::write(&explicit, "max_input_bytes = 200\n").unwrap();

    let output = cmd()
        .args([
            "-C",
            tmp.path().to_str().unwrap(),
            "--config",
            explicit.to_str().unwrap(),
            "info",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(json["config"]["max_input_bytes"], 200);
}

#[test]
fn env_var_overrides_config_file() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("ingest-guard.toml"), "max_input_lines = 3\n").unwrap();

    let output = cmd()
        .env("INGEST_GUARD_MAX_INPUT_LINES", "30")
        .args(["-C", tmp.path().to_str().unwrap(), "info", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(json["config"]["max_input_lines"], 30);
}

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let sub = repo.join("sub");
    fs::create_dir_all(&sub).unwrap();
    fs::create_dir_all(repo.join(".git")).unwrap();
    fs::write(tmp.path().join("ingest-guard.toml"), "max_input_bytes = 9\n").unwrap();

    let json = info_json(&sub);

    assert_eq!(json["config"]["max_input_bytes"], 5 * 1024 * 1024);
    assert!(json["config"]["config_file"].is_null());
}

// =============================================================================
// Config drives the check command
// =============================================================================

#[test]
fn configured_limits_apply_to_check() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("ingest-guard.toml"), "max_input_bytes = 4\n").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "check"])
        .write_stdin("12345")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeded byte size limit"));

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "check", "--max-bytes", "5"])
        .write_stdin("12345")
        .assert()
        .success();
}

// =============================================================================
// Invalid configuration
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("ingest-guard.toml"), "max_input_bytes = [").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}

#[test]
fn zero_limit_in_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("ingest-guard.toml"), "max_input_bytes = 0\n").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}

#[test]
fn unknown_config_field_is_ignored() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("ingest-guard.toml"),
        "max_input_lines = 4\nsomething_else = true\n",
    )
    .unwrap();

    let json = info_json(tmp.path());

    assert_eq!(json["config"]["max_input_lines"], 4);
}
