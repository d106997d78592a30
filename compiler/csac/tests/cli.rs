// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the `csac` binary.

use std::path::PathBuf;
use std::process::{Command, Output};

fn csac(args: &[&str]) -> Output {
    let binary = PathBuf::from(env!("CARGO_BIN_EXE_csac"));
    Command::new(binary)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute csac")
}

fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn check_reports_findings_and_fails() {
    let output = csac(&["check", "--color=never", &fixture("widget.json")]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "{stderr}");
    assert!(stderr.contains("warning[MA01]"), "{stderr}");
    assert!(stderr.contains("Allocator not passed to member 'd_field'"), "{stderr}");
    assert!(stderr.contains("widget.cpp:12:12"), "{stderr}");
}

#[test]
fn check_json_goes_to_stdout() {
    let output = csac(&["check", "--format=json", &fixture("widget.json")]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert_eq!(output.status.code(), Some(1));
    let findings: serde_json::Value = serde_json::from_str(&stdout).expect("JSON array");
    let codes: Vec<&str> = findings
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, ["MA02", "MA02", "MA01"]);
}

#[test]
fn check_without_allocator_class_is_clean() {
    let output = csac(&[
        "check",
        "--allocator=other::Allocator",
        &fixture("widget.json"),
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.starts_with("OK: 1 unit(s) checked"), "{stdout}");
}

#[test]
fn check_malformed_dump_fails() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, r#"{ "nodes": [ { "node": "pointer", "to": 3 } ] }"#)
        .expect("failed to write dump");

    let output = csac(&["check", path.to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr.contains("node 0 refers to undefined type #3"),
        "{stderr}"
    );
}

#[test]
fn check_rejects_unknown_option() {
    let output = csac(&["check", "--bogus", &fixture("widget.json")]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("unknown option '--bogus'"), "{stderr}");
}

#[test]
fn explain_prints_docs() {
    let output = csac(&["explain", "ma04"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("MA04"));

    let unknown = csac(&["explain", "E0001"]);
    assert_eq!(unknown.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&unknown.stderr).contains("Known codes: MA01, MA02, MA04"));
}

#[test]
fn explain_without_code_prints_usage() {
    let output = csac(&["explain"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("Usage: csac explain <CODE>"), "{stderr}");
}
