//! CLI integration tests

use std::process::Command;

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pms-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("Prometheus pod-metrics source"),
        "Should show app description"
    );
    assert!(stdout.contains("get"), "Should show get command");
    assert!(stdout.contains("schema"), "Should show schema command");
    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("PMS_PROMQL_API"), "Should show env var");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pms-cli", "--", "--version"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("pms"), "Should show binary name");
}

/// Test get subcommand help
#[test]
fn test_get_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pms-cli", "--", "get", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Get help should succeed");
    assert!(stdout.contains("--id"), "Should show id filter option");
    assert!(stdout.contains("timeseries"), "Should show default table");
}

/// Test schema subcommand help
#[test]
fn test_schema_help() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pms-cli", "--", "schema", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Schema help should succeed");
    assert!(stdout.contains("TABLE"), "Should show table argument");
}

/// Test format option
#[test]
fn test_format_option() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pms-cli", "--", "--help"])
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pms-cli", "--", "invalid-command"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}

/// Test schema introspection works without an endpoint
#[test]
fn test_schema_requires_no_endpoint() {
    let output = Command::new("cargo")
        .args(["run", "-p", "pms-cli", "--", "--format", "json", "schema", "timeseries"])
        .env_remove("PMS_PROMQL_API")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Schema should not need an endpoint");
    assert!(stdout.contains("\"timestamp\""), "Should list timestamp column");
    assert!(stdout.contains("\"memory_usage\""), "Should list metric columns");
}
