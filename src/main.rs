//! Starknet account bootstrapper.
//!
//! # Architecture Overview
//!
//! ```text
//!   .env / env / TOML / CLI
//!            │
//!            ▼
//!     ┌─────────────┐   chainId    ┌──────────────┐
//!     │   config    │────────────▶│ JsonRpcClient │◀─────────────┐
//!     └──────┬──────┘              └──────────────┘              │
//!            ▼                                                    │
//!     ┌─────────────────────────────────────────────┐            │
//!     │              DeployOrchestrator             │            │
//!     │  keys → address → estimate → credentials    │── RPC ─────┤
//!     │  → FundingGate (stdin) → submit → poller    │            │
//!     └─────────────────────────────────────────────┘            │
//!            │                                    ConfirmationPoller
//!            ▼
//!     console summary + exit code
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use account_bootstrap::config::{load_config, Overrides};
use account_bootstrap::deploy::{connect_node, ConsoleFundingGate};
use account_bootstrap::lifecycle::spawn_ctrl_c_handler;
use account_bootstrap::observability::logging;
use account_bootstrap::starknet::JsonRpcClient;
use account_bootstrap::{DeployError, DeployOrchestrator, DeploymentReport, Shutdown};

#[derive(Parser)]
#[command(name = "account-bootstrap")]
#[command(about = "Generate, fund and deploy a new Starknet account", long_about = None)]
struct Cli {
    /// Optional TOML settings file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// `.env` file read at startup and updated with the new credentials.
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Account contract class to deploy.
    #[arg(long)]
    class_hash: Option<String>,

    /// Seconds between confirmation checks.
    #[arg(long)]
    poll_interval: Option<u64>,

    /// Confirmation checks before giving up.
    #[arg(long)]
    max_attempts: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) if report.outcome.is_success() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Deployment failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<DeploymentReport, DeployError> {
    let overrides = Overrides {
        env_file: cli.env_file,
        class_hash: cli.class_hash,
        poll_interval_secs: cli.poll_interval,
        max_attempts: cli.max_attempts,
    };
    let settings = load_config(cli.config.as_deref(), &overrides)?;

    tracing::info!(
        class_hash = %settings.account.class_hash,
        poll_interval_secs = settings.confirmation.poll_interval_secs,
        max_attempts = settings.confirmation.max_attempts,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    spawn_ctrl_c_handler(shutdown.clone());

    let (client, chain_id) = connect_node(&settings, |url, rpc| async move {
        JsonRpcClient::connect(url, &rpc).await
    })
    .await?;

    let gate = ConsoleFundingGate::new(shutdown.subscribe());
    let mut orchestrator = DeployOrchestrator::new(&client, chain_id, settings, gate)
        .with_shutdown(shutdown.subscribe());

    orchestrator.run().await
}
