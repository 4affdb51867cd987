//! CLI integration tests for mm-plugin-audit
//!
//! Runs the binary end-to-end using assert_cmd, against a mock server where
//! a network is needed.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command with the `MM_*` environment cleared, run from an empty directory
/// so no `.env` file is picked up.
#[allow(deprecated)]
fn audit_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("mm-plugin-audit").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("MM_URL")
        .env_remove("MM_TOKEN")
        .env_remove("MM_USERNAME")
        .env_remove("MM_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

async fn mock_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/plugins"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": [
                {"id": "com.mattermost.confluence", "name": "Confluence", "version": "1.3.0",
                 "server": {"executable": "server/dist/plugin"}},
                {"id": "com.mattermost.welcomebot", "name": "WelcomeBot", "version": "1.2.0",
                 "server": {"executable": "server/dist/plugin"}}
            ],
            "inactive": [
                {"id": "com.pexip.meetings", "name": "Pexip", "version": "1.3.0",
                 "webapp": {"bundle_path": "webapp/dist/main.js"}}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/plugins/marketplace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"homepage_url": "https://github.com/mattermost/mattermost-plugin-confluence",
             "manifest": {"id": "com.mattermost.confluence", "version": "1.4.0"}},
            {"homepage_url": "https://github.com/mattermost/mattermost-plugin-welcomebot",
             "manifest": {"id": "com.mattermost.welcomebot", "version": "1.2.0"}}
        ])))
        .mount(&server)
        .await;
    server
}

#[test]
fn version_flag_prints_version() {
    let dir = TempDir::new().unwrap();
    audit_cmd(&dir)
        .arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(concat!("mm-plugin-audit ", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn missing_url_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    audit_cmd(&dir)
        .args(["--token", "abc"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("server URL is required"));
}

#[test]
fn invalid_format_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    audit_cmd(&dir)
        .args(["--url", "http://127.0.0.1:9", "--token", "abc", "--format", "xml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid format"));
}

#[test]
fn missing_credentials_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    audit_cmd(&dir)
        .args(["--url", "http://127.0.0.1:9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("authentication required"));
}

#[test]
fn username_without_password_exits_with_config_error() {
    let dir = TempDir::new().unwrap();
    audit_cmd(&dir)
        .args(["--url", "http://127.0.0.1:9", "--username", "admin"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("MM_PASSWORD"));
}

#[test]
fn unreachable_server_exits_with_api_error() {
    let dir = TempDir::new().unwrap();
    audit_cmd(&dir)
        .args(["--url", "http://127.0.0.1:9", "--token", "abc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unable to connect to http://127.0.0.1:9"));
}

#[test]
fn url_can_come_from_env_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".env"), "MM_URL=http://127.0.0.1:9\n").unwrap();
    audit_cmd(&dir)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("authentication required"));
}

#[tokio::test(flavor = "multi_thread")]
async fn json_report_against_mock_server() {
    let server = mock_server().await;
    let url = server.uri();

    let output = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        audit_cmd(&dir)
            .args(["--url", &url, "--token", "abc", "--format", "json"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["summary"]["total"], 3);
    assert_eq!(report["summary"]["outdated"], 1);
    assert_eq!(report["summary"]["third_party"], 1);
    assert_eq!(report["plugins"][0]["plugin_id"], "com.mattermost.confluence");
    assert_eq!(report["plugins"][0]["update_available"], true);
    assert_eq!(report["plugins"][2]["source"], "third-party");
    assert!(report["plugins"][2]["update_available"].is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn outdated_only_csv_written_to_file() {
    let server = mock_server().await;
    let url = server.uri();

    let (stdout, csv) = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("report.csv");
        let output = audit_cmd(&dir)
            .args(["--url", &url, "--token", "abc", "--format", "csv", "--outdated-only"])
            .arg("--output")
            .arg(&report)
            .output()
            .unwrap();
        assert!(output.status.success());
        (output.stdout, std::fs::read_to_string(&report).unwrap())
    })
    .await
    .unwrap();

    assert!(stdout.is_empty());
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("plugin_id,name,installed_version"));
    assert!(lines[1].starts_with("com.mattermost.confluence,Confluence,1.3.0,1.4.0,true"));
    assert!(lines[2].starts_with("com.pexip.meetings,Pexip,1.3.0,,unknown"));
    assert!(!csv.contains("welcomebot"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unwritable_output_falls_back_to_stdout() {
    let server = mock_server().await;
    let url = server.uri();

    let output = tokio::task::spawn_blocking(move || {
        let dir = TempDir::new().unwrap();
        let report = dir.path().join("missing").join("report.txt");
        audit_cmd(&dir)
            .args(["--url", &url, "--token", "abc"])
            .arg("--output")
            .arg(&report)
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Marketplace Plugins (2) ==="));
    assert!(stdout.contains("Summary: 3 plugin(s) total"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("falling back to stdout"));
}
