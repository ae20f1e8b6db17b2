//! Integration tests for the `nxrm` binary.
//!
//! Argument parsing, offline commands, configuration handling and exit
//! codes, all without a live Nexus instance.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `nxrm` binary with env isolation.
///
/// Clears all `NXRM_*` variables and points config directories at a
/// nonexistent path so tests never touch the user's configuration.
fn nxrm_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("nxrm");
    cmd.env("HOME", "/tmp/nxrm-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/nxrm-cli-test-nonexistent")
        .env_remove("NXRM_CONFIG")
        .env_remove("NXRM_PROFILE")
        .env_remove("NXRM_URL")
        .env_remove("NXRM_USERNAME")
        .env_remove("NXRM_PASSWORD")
        .env_remove("NXRM_INSECURE")
        .env_remove("NXRM_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Connection flags for a server that refuses connections.
const UNREACHABLE: [&str; 8] = [
    "--url",
    "http://127.0.0.1:1",
    "--username",
    "admin",
    "--password",
    "admin123",
    "--timeout",
    "5",
];

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = nxrm_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    nxrm_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Nexus")
            .and(predicate::str::contains("create"))
            .and(predicate::str::contains("import"))
            .and(predicate::str::contains("schema")),
    );
}

#[test]
fn test_version_flag() {
    nxrm_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nxrm"));
}

#[test]
fn test_completions_zsh() {
    nxrm_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Offline commands ────────────────────────────────────────────────

#[test]
fn test_types_plain_lists_resources_and_data_sources() {
    nxrm_cmd()
        .args(["types", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("sonatyperepo_role\n")
                .and(predicate::str::contains("sonatyperepo_repository_maven_proxy"))
                .and(predicate::str::contains("sonatyperepo_repositories")),
        );
}

#[test]
fn test_types_data_sources_only() {
    let output = nxrm_cmd()
        .args(["types", "--data-sources"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let types = stdout_json(&output);
    let types = types.as_array().unwrap();
    assert!(!types.is_empty());
    assert!(types.iter().all(|t| t["kind"] == "data source"));
}

#[test]
fn test_schema_of_one_type() {
    let output = nxrm_cmd()
        .args(["schema", "sonatyperepo_blob_store_s3"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["version"], 1);
}

#[test]
fn test_full_schema_export() {
    let output = nxrm_cmd().args(["schema", "-o", "json-compact"]).output().unwrap();
    assert!(output.status.success());
    let export = stdout_json(&output);
    assert_eq!(export["provider_name"], "sonatyperepo");
    assert!(export["resource_schemas"]["sonatyperepo_security_realms"].is_object());
}

#[test]
fn test_unknown_type_is_a_usage_error() {
    nxrm_cmd()
        .args(["schema", "sonatyperepo_nope"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sonatyperepo_nope"));
}

#[test]
fn test_upgrade_s3_state_from_v0() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    std::fs::write(
        &state,
        json!({
            "name": "s3-store",
            "bucket_region": "eu-west-1",
            "bucket_name": "artifacts",
            "bucket_prefix": "nexus",
            "bucket_expiration": 7
        })
        .to_string(),
    )
    .unwrap();

    let output = nxrm_cmd()
        .args(["upgrade", "sonatyperepo_blob_store_s3", "--from-version", "0", "--state"])
        .arg(&state)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let upgraded = stdout_json(&output);
    assert_eq!(upgraded["bucket_configuration"]["bucket"]["name"], "artifacts");
    assert!(upgraded.get("bucket_name").is_none());
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_lifecycle_without_config_fails_with_usage() {
    nxrm_cmd()
        .args(["import", "sonatyperepo_role", "admins"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Profile 'default' not found"));
}

#[test]
fn test_broken_plan_file_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let plan = dir.path().join("plan.json");
    std::fs::write(&plan, "{ not json").unwrap();

    nxrm_cmd()
        .args(UNREACHABLE)
        .args(["create", "sonatyperepo_role", "--plan"])
        .arg(&plan)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("plan"));
}

#[test]
fn test_unreachable_server_reports_outcome_and_connection_exit() {
    let dir = tempfile::tempdir().unwrap();
    let plan = dir.path().join("plan.json");
    std::fs::write(
        &plan,
        json!({ "id": "r", "name": "r", "privileges": [], "roles": [] }).to_string(),
    )
    .unwrap();

    let output = nxrm_cmd()
        .args(UNREACHABLE)
        .args(["create", "sonatyperepo_role", "--plan"])
        .arg(&plan)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
    let outcome = stdout_json(&output);
    assert!(outcome["state"].is_null());
    assert_eq!(outcome["diagnostics"][0]["severity"], "error");
    assert_eq!(outcome["diagnostics"][0]["category"], "transport");
}

#[test]
fn test_invalid_plan_is_rejected_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let plan = dir.path().join("plan.json");
    std::fs::write(&plan, r#"{ "active": [] }"#).unwrap();

    let output = nxrm_cmd()
        .args(UNREACHABLE)
        .args(["create", "sonatyperepo_security_realms", "--plan"])
        .arg(&plan)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2), "{}", combined_output(&output));
    let outcome = stdout_json(&output);
    assert_eq!(outcome["diagnostics"][0]["severity"], "error");
    assert_eq!(outcome["diagnostics"][0]["category"], "validation");
    assert_eq!(outcome["diagnostics"][0]["attribute"], "active");
}

// ── Config subcommands ──────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nxrm.toml");

    nxrm_cmd()
        .arg("--config")
        .arg(&config)
        .args([
            "--url",
            "https://nexus.example.com",
            "--username",
            "deployer",
            "-p",
            "prod",
            "config",
            "init",
            "--password-env",
            "PROD_NEXUS_PW",
        ])
        .assert()
        .success();

    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("default_profile = \"prod\""));
    assert!(written.contains("password_env = \"PROD_NEXUS_PW\""));

    let output = nxrm_cmd()
        .arg("--config")
        .arg(&config)
        .args(["config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let shown = stdout_json(&output);
    assert_eq!(shown["profiles"]["prod"]["username"], "deployer");
}

#[test]
fn test_config_init_requires_url() {
    let dir = tempfile::tempdir().unwrap();
    nxrm_cmd()
        .arg("--config")
        .arg(dir.path().join("nxrm.toml"))
        .args(["--username", "admin", "config", "init"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_profile_password_env_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("nxrm.toml");
    std::fs::write(
        &config,
        r#"
        [profiles.default]
        url = "http://127.0.0.1:1"
        username = "admin"
        "#,
    )
    .unwrap();

    // No password anywhere: the credential chain runs dry.
    nxrm_cmd()
        .arg("--config")
        .arg(&config)
        .args(["import", "sonatyperepo_role", "admins"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No password configured"));

    // With NXRM_PASSWORD the call gets as far as the network.
    nxrm_cmd()
        .arg("--config")
        .arg(&config)
        .env("NXRM_PASSWORD", "admin123")
        .args(["import", "sonatyperepo_role", "admins"])
        .assert()
        .code(7);
}
