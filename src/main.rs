//! opsgenie-heartbeat - signal "this job is alive" to Opsgenie
//!
//! # Usage
//!
//! ```bash
//! # From cron, after a job finishes
//! OPSGENIE_HEARTBEAT_KEY=xxxx opsgenie-heartbeat nightly-backup
//! ```
//!
//! # Environment Variables
//!
//! - `OPSGENIE_HEARTBEAT_KEY`: Opsgenie API key (required)
//! - `OPSGENIE_API_ENDPOINT`: API root (default: `https://api.opsgenie.com`)
//! - `RUST_LOG`: Logging level (default: warn), written to stderr
//!
//! Exits 0 when the ping succeeds, 1 on any failure or misuse.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use opsgenie_heartbeat::{HeartbeatConfig, Pinger};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "opsgenie-heartbeat")]
#[command(about = "Send a heartbeat ping to the Opsgenie Heartbeat API")]
#[command(version)]
struct CliArgs {
    /// Name of the heartbeat to ping, as registered in Opsgenie
    heartbeat: String,
}

const USAGE: &str =
    "incorrect usage of `opsgenie-heartbeat`. Must include heartbeat name as only arg.";

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout is reserved for the usage/failure lines.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            debug!(error = %e, "Argument parsing failed");
            println!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    // Ctrl+C aborts retries instead of waiting out the backoff
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, cancelling heartbeat");
        shutdown_token.cancel();
    });

    match run(&args.heartbeat, &cancel_token).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("failed to send heartbeat: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(heartbeat: &str, cancel_token: &CancellationToken) -> Result<()> {
    let config = HeartbeatConfig::from_env().context("invalid configuration")?;
    let pinger = Pinger::from_config(&config)?;

    pinger.ping(heartbeat, cancel_token).await?;
    Ok(())
}
