//! CLI integration tests

use std::process::Command;

fn carbonctl() -> Command {
    Command::new(env!("CARGO_BIN_EXE_carbonctl"))
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = carbonctl()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Carbon Optimizer"), "Should show app name");
    assert!(stdout.contains("regions"), "Should show regions command");
    assert!(stdout.contains("suggest"), "Should show suggest command");
    assert!(stdout.contains("calculate"), "Should show calculate command");
    assert!(stdout.contains("compare"), "Should show compare command");
    assert!(stdout.contains("schedule"), "Should show schedule command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = carbonctl()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("carbonctl"), "Should show binary name");
}

/// Test suggest subcommand help
#[test]
fn test_suggest_help() {
    let output = carbonctl()
        .args(["suggest", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Suggest help should succeed");
    assert!(stdout.contains("--workload"), "Should show workload option");
    assert!(stdout.contains("--priority"), "Should show priority option");
    assert!(stdout.contains("--duration"), "Should show duration option");
}

/// Test that compare requires at least one option
#[test]
fn test_compare_requires_option() {
    let output = carbonctl()
        .arg("compare")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Compare without options should fail");
}

/// Test that an unreachable service is reported as an error
#[test]
fn test_unreachable_service_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = carbonctl()
        .env("HOME", home.path())
        .args(["--api-url", "http://127.0.0.1:9", "regions", "list"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unreachable API should fail");
    assert!(stderr.contains("Failed to send request"));
}
