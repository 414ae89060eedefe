//! Integration tests for the `adminly` CLI binary.
//!
//! Argument parsing, help output and completions run without a backend;
//! the collection commands run against a wiremock admin API.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `adminly` binary with env isolation.
///
/// Clears all `ADMINLY_*` env vars and points the config file into
/// `home` so tests never touch the user's real configuration.
fn adminly_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("adminly");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("ADMINLY_CONFIG", home.join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("ADMINLY_PROFILE")
        .env_remove("ADMINLY_API_URL")
        .env_remove("ADMINLY_TOKEN")
        .env_remove("ADMINLY_OUTPUT")
        .env_remove("ADMINLY_INSECURE")
        .env_remove("ADMINLY_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn envelope(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

fn user_page(ids: &[i64], total: u64) -> ResponseTemplate {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({ "id": id, "name": format!("User {id}"), "email": format!("u{id}@example.com") }))
        .collect();
    envelope(json!({ "items": items, "page": 1, "limit": 10, "total": total }))
}

/// Run the binary against `server` off the async runtime.
async fn run_against(server: &MockServer, home: &Path, args: &[&str]) -> std::process::Output {
    let mut cmd = adminly_cmd(home);
    cmd.args(["--api-url", &format!("{}/api/admin", server.uri()), "--token", "tok"])
        .args(args);
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = adminly_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = tempfile::tempdir().unwrap();
    adminly_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("users")
            .and(predicate::str::contains("transactions"))
            .and(predicate::str::contains("predictions")),
    );
}

#[test]
fn test_version_flag() {
    let home = tempfile::tempdir().unwrap();
    adminly_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("adminly"));
}

#[test]
fn test_completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    adminly_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_collection_subcommands_exist() {
    let home = tempfile::tempdir().unwrap();
    adminly_cmd(home.path())
        .args(["transactions", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("get"))
                .and(predicate::str::contains("bulk-delete"))
                .and(predicate::str::contains("export")),
        );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_list_without_backend_points_at_config() {
    let home = tempfile::tempdir().unwrap();
    adminly_cmd(home.path())
        .args(["users", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config init").or(predicate::str::contains("--api-url")));
}

#[test]
fn test_invalid_output_format() {
    let home = tempfile::tempdir().unwrap();
    let output = adminly_cmd(home.path())
        .args(["--output", "invalid", "users", "list"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_bad_date_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    adminly_cmd(home.path())
        .args(["users", "list", "--from", "yesterday"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    let home = tempfile::tempdir().unwrap();
    adminly_cmd(home.path()).args(["config", "show"]).assert().success();
}

#[test]
fn test_config_set_creates_profile() {
    let home = tempfile::tempdir().unwrap();
    adminly_cmd(home.path())
        .args(["config", "set", "api_url", "https://admin.example.com/api/admin"])
        .assert()
        .success();

    adminly_cmd(home.path())
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));

    let written = std::fs::read_to_string(home.path().join("config.toml")).unwrap();
    assert!(written.contains("admin.example.com"));
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    adminly_cmd(home.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test]
async fn test_users_list_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .and(query_param("status", "active"))
        .respond_with(user_page(&[1, 2], 2))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run_against(
        &server,
        home.path(),
        &["-o", "json", "users", "list", "--status", "active"],
    )
    .await;

    assert!(output.status.success(), "{}", combined_output(&output));
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["User 1", "User 2"]);
}

#[tokio::test]
async fn test_plain_output_lists_ids() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(user_page(&[7, 8], 2))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run_against(&server, home.path(), &["-o", "plain", "users", "list"]).await;
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "7\n8");
}

#[tokio::test]
async fn test_page_out_of_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(user_page(&[1], 1))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run_against(&server, home.path(), &["users", "list", "--page", "9"]).await;
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("out of range"));
}

#[tokio::test]
async fn test_rejected_token_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/predictions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run_against(&server, home.path(), &["predictions", "list"]).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test]
async fn test_get_missing_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "success": false, "message": "no such user" })),
        )
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let output = run_against(&server, home.path(), &["users", "get", "99"]).await;
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("users list"));
}

#[tokio::test]
async fn test_bulk_delete_reports_partial_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/users/1"))
        .respond_with(envelope(json!(null)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/admin/users/2"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "success": false, "message": "user has open bets" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(user_page(&[2], 1))
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    // Duplicate ids collapse through the selection.
    let output = run_against(&server, home.path(), &["-y", "users", "bulk-delete", "1", "2", "1"]).await;

    assert_eq!(output.status.code(), Some(5), "{}", combined_output(&output));
    let text = combined_output(&output);
    assert!(text.contains("user has open bets"), "{text}");
    assert!(text.contains("1 of 2"), "{text}");
}

#[tokio::test]
async fn test_export_writes_dated_csv() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/transactions"))
        .respond_with(envelope(json!({ "items": [], "total": 0 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/transactions/export"))
        .and(query_param("type", "deposit"))
        .respond_with(ResponseTemplate::new(200).set_body_string("id,amount\n1,10\n"))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::tempdir().unwrap();
    let out_dir = home.path().join("exports");
    let output = run_against(
        &server,
        home.path(),
        &[
            "transactions",
            "export",
            "--type",
            "deposit",
            "--dir",
            out_dir.to_str().unwrap(),
        ],
    )
    .await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let files: Vec<_> = std::fs::read_dir(&out_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("transactions-export-"));
    assert!(files[0].ends_with(".csv"));
    let csv = std::fs::read_to_string(out_dir.join(&files[0])).unwrap();
    assert_eq!(csv, "id,amount\n1,10\n");
}
