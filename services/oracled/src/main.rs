//! Main Entrypoint for the Augur Oracle Daemon
//!
//! This binary is responsible for:
//! 1. Parsing CLI flags and loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Loading and validating the answer set.
//! 4. Running the coordinator client until Ctrl+C, then shutting down with a
//!    bounded grace period.

use anyhow::Context;
use augur_core::answers::{Answer, AnswerSet};
use augur_core::oracle::Oracle;
use augur_oracled::config::Config;
use augur_oracled::connection;
use clap::Parser;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long in-flight dispatch may run after shutdown is requested.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Satellite oracle service for the hardware coordinator daemon.
#[derive(Parser, Debug)]
#[command(name = "oracled", version, about)]
struct Cli {
    /// Coordinator address to connect to (overrides COORDINATOR_ADDR).
    #[arg(long)]
    coordinator: Option<SocketAddr>,

    /// Service name announced during registration (overrides SERVICE_NAME).
    #[arg(long)]
    service_name: Option<String>,

    /// Path to a JSON answer file (overrides ANSWERS_PATH).
    #[arg(long)]
    answers: Option<PathBuf>,
}

/// Loads a replacement answer set from `path`, expected to hold a JSON array
/// of `{"text": ..., "mood": ...}` objects.
fn load_answers(path: &Path) -> anyhow::Result<AnswerSet> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer file {}", path.display()))?;
    let answers: Vec<Answer> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse answer file {}", path.display()))?;
    AnswerSet::new(answers).with_context(|| format!("unusable answer file {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(addr) = cli.coordinator {
        config.coordinator_addr = addr;
    }
    if let Some(name) = cli.service_name {
        config.service_name = name;
    }
    if let Some(path) = cli.answers {
        config.answers_path = Some(path);
    }

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();

    // An unusable answer set must abort startup before any connect attempt.
    let answers = match &config.answers_path {
        Some(path) => load_answers(path)?,
        None => AnswerSet::classic(),
    };
    info!(answers = answers.len(), "answer set loaded");
    let oracle = Oracle::new(answers, config.answer_seed);

    let shutdown = CancellationToken::new();
    let client = tokio::spawn(connection::run(config, oracle, shutdown.clone()));

    tokio::signal::ctrl_c()
        .await
        .context("Failed to install Ctrl+C handler")?;
    info!("Received shutdown signal. Shutting down gracefully...");
    shutdown.cancel();

    match tokio::time::timeout(SHUTDOWN_GRACE, client).await {
        Ok(finished) => finished.context("coordinator client task panicked")??,
        Err(_) => warn!("shutdown grace period elapsed, abandoning the session loop"),
    }

    info!("oracled has shut down.");
    Ok(())
}
