use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use account_bootstrap::config::{load_config, Overrides};
use account_bootstrap::deploy::connect_node;
use account_bootstrap::inspect::{inspect, StatusReport};
use account_bootstrap::observability::logging;
use account_bootstrap::starknet::types::parse_felt;
use account_bootstrap::starknet::JsonRpcClient;

#[derive(Parser)]
#[command(name = "tx-status")]
#[command(about = "Show the status of a Starknet transaction", long_about = None)]
struct Cli {
    /// Transaction to inspect. Defaults to the first one in the latest block.
    #[arg(long)]
    tx_hash: Option<String>,

    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(report) => {
            print!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<StatusReport, Box<dyn std::error::Error>> {
    let tx_hash = cli
        .tx_hash
        .as_deref()
        .map(|hash| parse_felt("transaction hash", hash))
        .transpose()?;

    let overrides = Overrides {
        env_file: cli.env_file,
        ..Overrides::default()
    };
    let settings = load_config(cli.config.as_deref(), &overrides)?;

    let (client, _chain_id) = connect_node(&settings, |url, rpc| async move {
        JsonRpcClient::connect(url, &rpc).await
    })
    .await?;

    Ok(inspect(&client, tx_hash).await?)
}
