//! End-to-end CLI integration tests
//!
//! These tests invoke the compiled binary as a subprocess to verify
//! that the CLI behaves correctly from a user's perspective.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
///
/// Note: `cargo_bin` is marked deprecated for edge cases involving custom
/// cargo build directories, but works correctly for standard project layouts.
#[allow(deprecated)]
fn cmd() -> Command {
    let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("INGEST_GUARD_MAX_INPUT_BYTES")
        .env_remove("INGEST_GUARD_MAX_INPUT_LINES");
    cmd
}

/// Write `contents` to `input.txt` in a fresh temp dir.
fn input_file(contents: &str) -> (TempDir, String) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("input.txt");
    fs::write(&path, contents).unwrap();
    let path = path.to_str().unwrap().to_string();
    (tmp, path)
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_shows_usage() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("Options:"));
}

#[test]
fn long_help_lists_environment_variables() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("INGEST_GUARD_MAX_INPUT_BYTES"));
}

#[test]
fn version_flag_shows_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_only_prints_bare_version() {
    cmd()
        .arg("--version-only")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "{}\n",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn no_subcommand_shows_help() {
    // arg_required_else_help makes clap print help to stderr and exit 2
    cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

// =============================================================================
// Info Command
// =============================================================================

#[test]
fn info_shows_package_name_and_version() {
    cmd()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_NAME")))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_json_reports_default_limits() {
    let tmp = TempDir::new().unwrap();
    let output = cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "info", "--json"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: Value = serde_json::from_str(&stdout).expect("info --json should output valid JSON");

    assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(json["config"]["max_input_bytes"], 5 * 1024 * 1024);
    assert!(json["config"]["max_input_lines"].is_null());
}

// =============================================================================
// Check Command
// =============================================================================

#[test]
fn check_passes_within_limits() {
    let (_tmp, path) = input_file("ab\ncd");
    cmd()
        .args(["check", &path, "--max-bytes", "100", "--max-lines", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS:"))
        .stdout(predicate::str::contains("5 bytes, 2 lines"));
}

#[test]
fn check_fails_on_byte_limit() {
    let (_tmp, path) = input_file(&"x".repeat(50));
    cmd()
        .args(["check", &path, "--max-bytes", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeded byte size limit"));
}

#[test]
fn check_fails_on_line_limit() {
    let (_tmp, path) = input_file("1\n2\n3\n");
    cmd()
        .args(["check", &path, "--max-lines", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeded line count limit"));
}

#[test]
fn check_line_limit_equality_passes() {
    let (_tmp, path) = input_file("1\n2\n3\n");
    cmd()
        .args(["check", &path, "--max-lines", "3"])
        .assert()
        .success();
}

#[test]
fn check_reads_stdin() {
    cmd()
        .args(["check", "--max-lines", "5"])
        .write_stdin("one\ntwo\nthree")
        .assert()
        .success()
        .stdout(predicate::str::contains("<stdin>"))
        .stdout(predicate::str::contains("13 bytes, 3 lines"));
}

#[test]
fn check_dash_reads_stdin() {
    cmd()
        .args(["check", "-", "--max-bytes", "3"])
        .write_stdin("too long")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<stdin>"));
}

#[test]
fn check_json_reports_partial_counts() {
    let (_tmp, path) = input_file("a\nb\nc\nd\n");
    let output = cmd()
        .args(["check", &path, "--max-lines", "2", "--json"])
        .assert()
        .failure();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: Value = serde_json::from_str(&stdout).expect("check --json should output valid JSON");
    assert_eq!(json["pass"], false);
    assert_eq!(json["failure"], "exceeded-line-count-limit");
    assert_eq!(json["lines_read"], 4);
    assert_eq!(json["max_lines"], 2);
}

#[test]
fn check_json_pass() {
    let (_tmp, path) = input_file("");
    let output = cmd().args(["check", &path, "--json"]).assert().success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    let json: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["pass"], true);
    assert_eq!(json["bytes_read"], 0);
    assert_eq!(json["lines_read"], 0);
    assert!(json.get("failure").is_none());
}

#[test]
fn check_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nope.txt");
    cmd()
        .args(["check", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open"));
}

#[test]
fn check_rejects_zero_limit() {
    cmd()
        .args(["check", "--max-bytes", "0"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--max-bytes"));
}

#[test]
fn check_line_flags_conflict() {
    cmd()
        .args(["check", "--max-lines", "3", "--no-line-limit"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn check_no_line_limit_overrides_config() {
    let (tmp, path) = input_file("1\n2\n3\n");
    fs::write(tmp.path().join("ingest-guard.toml"), "max_input_lines = 1\n").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "check", &path])
        .assert()
        .failure();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "check", &path, "--no-line-limit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 lines"));
}

// =============================================================================
// Global Flags
// =============================================================================

#[test]
fn quiet_flag_accepted() {
    cmd().args(["--quiet", "info"]).assert().success();
}

#[test]
fn verbose_flags_accepted() {
    cmd().args(["-vv", "info"]).assert().success();
}

#[test]
fn color_never_accepted() {
    cmd().args(["--color", "never", "info"]).assert().success();
}

#[test]
fn log_dir_env_writes_jsonl() {
    let tmp = TempDir::new().unwrap();
    let logs = tmp.path().join("logs");
    cmd()
        .env("INGEST_GUARD_LOG_DIR", &logs)
        .args(["-v", "check", "--max-bytes", "64"])
        .write_stdin("hello\n")
        .assert()
        .success();

    let log = fs::read_to_string(logs.join("ingest-guard.jsonl")).unwrap();
    assert!(log.lines().all(|line| serde_json::from_str::<Value>(line).is_ok()));
    assert!(log.contains("executing check command"));
}

#[test]
fn failure_log_has_no_color_codes() {
    let tmp = TempDir::new().unwrap();
    let logs = tmp.path().join("logs");
    cmd()
        .env("INGEST_GUARD_LOG_DIR", &logs)
        .args(["--color", "always", "check", "--max-bytes", "3"])
        .write_stdin("too long")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<stdin>: exceeded byte size limit"));

    let log = fs::read_to_string(logs.join("ingest-guard.jsonl")).unwrap();
    assert!(log.contains("fatal error"));
    assert!(!log.contains('\u{1b}'), "log contains ANSI escapes: {log}");
}
