//! End-to-end tests for the `sf` binary.
//!
//! Each test runs the compiled binary with an isolated config directory so a
//! developer's own `~/.config/sf/config.toml` cannot leak in.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn sf_binary() -> String {
    env!("CARGO_BIN_EXE_sf").to_string()
}

fn sf(home: &Path) -> Command {
    let mut command = Command::new(sf_binary());
    command
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .env_remove("SF_STRICT_DATES")
        .env_remove("SF_GROUP_BY")
        .env_remove("SF_SUMMARY_JSON");
    command
}

/// Runs `sf` with `stdin` piped in.
fn run_with_stdin(command: &mut Command, stdin: &str) -> Output {
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sf");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "sf should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_key_encode_and_decode() {
    let temp = TempDir::new().unwrap();

    let output = sf(temp.path())
        .args(["key", "encode", "GRP", "12", "3", "0"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "GRP@12@3\n");

    let output = sf(temp.path())
        .args(["key", "decode", "GRP@12@3"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "[\"GRP\",12,3]\n");
}

#[test]
fn test_key_decode_rejects_text_tail() {
    let temp = TempDir::new().unwrap();

    let output = sf(temp.path())
        .args(["key", "decode", "A@b"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("is not an integer"), "stderr: {stderr}");
}

#[test]
fn test_contrast_prints_pairs() {
    let temp = TempDir::new().unwrap();

    let output = sf(temp.path())
        .args(["contrast", "#00000000", "ffffff"])
        .output()
        .unwrap();
    assert_eq!(stdout_of(&output), "#00000000 #606060\nffffff #000000\n");
}

#[test]
fn test_classify_reads_stdin() {
    let temp = TempDir::new().unwrap();

    let output = run_with_stdin(
        sf(temp.path()).args(["classify", "--kind", "resource-events"]),
        r#"[{"resource": "M1", "start": "2025-01-29T12:00:00Z", "end": "2025-01-29T12:10:00Z", "delay": "setup"}]"#,
    );
    assert_eq!(
        stdout_of(&output),
        "{\"kind\":\"delay\",\"start\":1738152000000,\"end\":1738152600000,\"resource\":\"M1\",\"delay\":\"setup\"}\n"
    );
}

#[test]
fn test_strict_dates_from_config_file() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("sf.toml");
    std::fs::write(&config_path, "strict_dates = true\n").unwrap();

    let output = run_with_stdin(
        sf(temp.path())
            .arg("--config")
            .arg(&config_path)
            .arg("classify"),
        r#"[{"id": "J1", "start": "tomorrow"}]"#,
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unparsable date in start"), "stderr: {stderr}");
}

#[test]
fn test_summary_groups_by_marker() {
    let temp = TempDir::new().unwrap();

    let output = run_with_stdin(
        sf(temp.path()).args(["summary", "--by", "marker", "--json"]),
        r#"[
            {"resource": "M1", "start": 0, "end": 60000, "alarm": "E-STOP"},
            {"resource": "M2", "start": 0, "end": 30000, "alarm": "E-STOP"},
            {"resource": "M1", "start": 60000, "end": 90000, "job": ["W", 4]}
        ]"#,
    );
    let value: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "E-STOP": {"M1": 60000, "M2": 30000},
            "W@4": {"M1": 30000}
        })
    );
}

#[test]
fn test_summary_saturates_extreme_ranges() {
    let temp = TempDir::new().unwrap();

    let output = run_with_stdin(
        sf(temp.path()).args(["summary", "--json"]),
        r#"[
            {"resource": "M1", "start": -9223372036854775808, "end": 9223372036854775807},
            {"resource": "M1", "start": 0, "end": 10}
        ]"#,
    );
    let value: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(value, serde_json::json!({"M1": {"M1": i64::MAX}}));
}

#[test]
fn test_no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();

    let output = sf(temp.path()).output().unwrap();
    assert!(stdout_of(&output).contains("Usage:"));
}
