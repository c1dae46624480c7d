//! GitHub Actions entry point.
//!
//! Reads one webhook event from the runner, mirrors it onto Asana, and exits
//! 0 on success or skip, 1 on any failure.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use asana_sync::telemetry::{init_tracing, LogFormat};
use asana_sync::{AsanaClient, Config, EventRouter, SyncError, SyncOutcome, WebhookEvent};

/// Mirror a GitHub issue event onto its Asana task.
#[derive(Debug, Parser)]
#[command(name = "asana-sync", version, about)]
struct Cli {
    /// Webhook event name
    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "")]
    event_name: String,

    /// Path to the webhook payload JSON
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Log output format (pretty or json)
    #[arg(long, env = "ASANA_SYNC_LOG_FORMAT", default_value = "pretty")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_format) {
        eprintln!("Failed to initialise logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli).await {
        Ok(outcome) => {
            info!(outcome = ?outcome, "Sync finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Sync failed");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<SyncOutcome, SyncError> {
    info!(event_name = %cli.event_name, "Starting Asana sync");

    let config = Config::from_env()?;
    info!(
        project_id = %config.project_id,
        section = %config.section_name,
        repository = %config.repository_name,
        "Configuration loaded"
    );

    let event = WebhookEvent::load(&cli.event_name, cli.event_path.as_deref())?;
    let client = AsanaClient::new(&config)?;

    EventRouter::new(&client, &config).route(&event).await
}
