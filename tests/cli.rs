//! CLI Contract Tests
//!
//! Runs the compiled `opsgenie-heartbeat` binary with a controlled
//! environment and checks stdout and the exit status.

use axum::http::StatusCode;
use axum::Router;
use std::process::Output;
use tokio::process::Command;

const USAGE: &str =
    "incorrect usage of `opsgenie-heartbeat`. Must include heartbeat name as only arg.";

async fn run(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_opsgenie-heartbeat"));
    cmd.args(args)
        .env_remove("OPSGENIE_HEARTBEAT_KEY")
        .env_remove("OPSGENIE_API_ENDPOINT")
        .env_remove("RUST_LOG");
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().await.unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

#[tokio::test]
async fn test_missing_heartbeat_name_prints_usage() {
    let output = run(&[], &[("OPSGENIE_HEARTBEAT_KEY", "key")]).await;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), USAGE);
}

#[tokio::test]
async fn test_extra_argument_prints_usage() {
    let output = run(&["key", "name"], &[("OPSGENIE_HEARTBEAT_KEY", "key")]).await;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stdout(&output), USAGE);
}

#[tokio::test]
async fn test_missing_key_fails() {
    let output = run(&["nightly-backup"], &[]).await;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "failed to send heartbeat: invalid configuration: OPSGENIE_HEARTBEAT_KEY is not set"
    );
}

#[tokio::test]
async fn test_ping_failure_reports_error() {
    // A key that cannot be sent as a header fails the ping before any retry.
    let env = [
        ("OPSGENIE_HEARTBEAT_KEY", "bad\nkey"),
        ("OPSGENIE_API_ENDPOINT", "http://127.0.0.1:9"),
    ];
    let output = run(&["nightly-backup"], &env).await;

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stdout(&output).starts_with("failed to send heartbeat: api key is not a valid header"),
        "stdout: {}",
        stdout(&output)
    );
}

#[tokio::test]
async fn test_successful_ping_exits_zero() {
    let app = Router::new().fallback(|| async { StatusCode::ACCEPTED });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let endpoint = format!("http://{addr}");
    let env = [
        ("OPSGENIE_HEARTBEAT_KEY", "key"),
        ("OPSGENIE_API_ENDPOINT", endpoint.as_str()),
    ];
    let output = run(&["nightly-backup"], &env).await;

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
}
