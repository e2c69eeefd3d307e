//! Integration tests for the `pb` CLI binary.
//!
//! Argument parsing, config round trips and exit codes run fully offline;
//! service-bound commands run against a local wiremock server via the
//! hidden `--api-url` flag.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::process::Output;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `pb` binary with env isolation.
///
/// Clears all `PB_*` env vars and points the config file into `home`,
/// so tests never touch the user's real configuration.
fn pb_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("pb");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("PB_CONFIG", config_file(home))
        .env("NO_COLOR", "1")
        .env_remove("PB_KEY")
        .env_remove("PB_API_KEY")
        .env_remove("PB_API_URL")
        .env_remove("PB_STREAM_URL")
        .env_remove("PB_OUTPUT")
        .env_remove("PB_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn config_file(home: &Path) -> PathBuf {
    home.join("pbcli").join("config.toml")
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a command off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

/// `pb` pointed at `server` with an API key on the command line.
fn service_cmd(home: &Path, server: &MockServer, args: &[&str]) -> assert_cmd::Command {
    let mut cmd = pb_cmd(home);
    cmd.args(["--api-url", &server.uri(), "--api-key", "o.test"])
        .args(args);
    cmd
}

async fn mount_devices(server: &MockServer, devices: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/v2/devices"))
        .and(header("Access-Token", "o.test"))
        .and(query_param("active", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "devices": devices })))
        .mount(server)
        .await;
}

fn two_devices() -> serde_json::Value {
    json!([
        { "iden": "ujpah72o0", "nickname": "Phone", "manufacturer": "Google",
          "model": "Pixel 8", "type": "android", "active": true, "pushable": true,
          "push_token": "tok-1" },
        { "iden": "ujpah72o1", "nickname": "Laptop", "model": "Chrome",
          "type": "chrome", "active": true, "pushable": true }
    ])
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = pb_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("device")
            .and(predicate::str::contains("push"))
            .and(predicate::str::contains("listen"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pb"));
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_invalid_subcommand_is_usage_error() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path()).arg("foobar").assert().code(2);
}

#[test]
fn test_push_link_requires_url() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path())
        .args(["push", "link", "-t", "hello"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--url"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_creates_missing_file() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Config file does not exist... creating"))
        .stdout(predicate::str::contains("Pushbullet API key"));
    assert!(config_file(home.path()).exists());
}

#[test]
fn test_config_set_then_show() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path())
        .args(["config", "set", "key", "o.abcdefgh1234"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Successfully updated config file!"));

    pb_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("****1234").and(predicate::str::contains("o.abcdefgh1234").not()),
        );

    pb_cmd(home.path())
        .args(["config", "show", "--reveal", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("key=o.abcdefgh1234"));
}

#[test]
fn test_config_set_unknown_field() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path())
        .args(["config", "set", "colour", "red"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_config_write_failure_exits_3() {
    let home = TempDir::new().unwrap();
    // The config "directory" is a regular file, so nothing can be written.
    std::fs::write(home.path().join("pbcli"), "not a directory").unwrap();

    pb_cmd(home.path())
        .args(["config", "set", "key", "o.abc"])
        .assert()
        .code(3);
}

#[test]
fn test_config_path() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_device_list_without_key_exits_3() {
    let home = TempDir::new().unwrap();
    pb_cmd(home.path())
        .args(["device", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No API key configured"));
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_device_list_table() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_devices(&server, two_devices()).await;

    let output = run(service_cmd(home.path(), &server, &["device", "list"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Phone"));
    assert!(stdout.contains("Pixel 8"));
    assert!(stdout.contains("ujpah72o1"));
    assert!(!stdout.contains("tok-1"), "push token leaked without -v");
}

#[tokio::test]
async fn test_device_list_verbose_shows_tokens() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_devices(&server, two_devices()).await;

    let output = run(service_cmd(home.path(), &server, &["device", "list", "-v"])).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("tok-1"));
}

#[tokio::test]
async fn test_device_list_resolves_target() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_devices(&server, two_devices()).await;

    for (target, expected) in [("1", "ujpah72o1"), ("Phone", "ujpah72o0"), ("Chrome", "ujpah72o1")] {
        let output = run(service_cmd(
            home.path(),
            &server,
            &["-o", "plain", "device", "list", "-d", target],
        ))
        .await;
        assert!(output.status.success(), "{}", combined_output(&output));
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), expected);
    }
}

#[tokio::test]
async fn test_device_not_found_exits_2() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_devices(&server, two_devices()).await;

    let output = run(service_cmd(home.path(), &server, &["device", "list", "-d", "kitchen"])).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Failed to locate device identified by kitchen"));
}

#[tokio::test]
async fn test_empty_device_list_exits_5() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_devices(&server, json!([])).await;

    let output = run(service_cmd(home.path(), &server, &["device", "list"])).await;
    assert_eq!(output.status.code(), Some(5));
    assert!(combined_output(&output).contains("No devices found"));
}

#[tokio::test]
async fn test_auth_failure_exits_5() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/devices"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": "invalid_access_token",
                "type": "invalid_request",
                "message": "Access token is missing or invalid."
            }
        })))
        .mount(&server)
        .await;

    let output = run(service_cmd(home.path(), &server, &["device", "list"])).await;
    assert_eq!(output.status.code(), Some(5));
    assert!(combined_output(&output).contains("Authentication failed"));
}

// ── Pushes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_push_note_to_resolved_device() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_devices(&server, two_devices()).await;
    Mock::given(method("POST"))
        .and(path("/v2/pushes"))
        .and(body_partial_json(json!({
            "type": "note",
            "title": "hi",
            "body": "there",
            "device_iden": "ujpah72o1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "iden": "push-1",
            "type": "note",
            "active": true,
            "title": "hi",
            "body": "there"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(service_cmd(
        home.path(),
        &server,
        &["-o", "plain", "push", "note", "-d", "Laptop", "-t", "hi", "-m", "there"],
    ))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "push-1");
}

#[tokio::test]
async fn test_push_link_sends_link_type() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/pushes"))
        .and(body_partial_json(json!({
            "type": "link",
            "url": "https://example.com/"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "iden": "push-2",
            "type": "link",
            "active": true,
            "url": "https://example.com/"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = run(service_cmd(
        home.path(),
        &server,
        &["push", "link", "-u", "https://example.com/"],
    ))
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Success!"));
}

#[tokio::test]
async fn test_push_to_unknown_device_sends_nothing() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_devices(&server, two_devices()).await;
    Mock::given(method("POST"))
        .and(path("/v2/pushes"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = run(service_cmd(
        home.path(),
        &server,
        &["push", "note", "-d", "9", "-t", "hi"],
    ))
    .await;
    assert_eq!(output.status.code(), Some(2));
}
