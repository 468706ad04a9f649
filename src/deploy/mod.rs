//! Account deployment subsystem.
//!
//! # Data Flow
//! ```text
//! KeyPair (generated or injected)
//!     → DeployAccountTransaction (address precomputed)
//!     → starknet_estimateFee (query-version signature)
//!     → resource bounds + worst-case fee
//!     → credential file (best effort)
//!     → FundingGate (operator funds the address)
//!     → starknet_addDeployAccountTransaction
//!     → ConfirmationPoller → DeploymentOutcome
//! ```
//!
//! # Design Decisions
//! - Every step awaits the previous one; there is no concurrency to manage
//! - The node, the funding barrier and the console writer are injected
//! - Persistence failure and confirmation timeout are warnings, not errors

pub mod funding;
pub mod orchestrator;
pub mod poller;

use std::fmt;
use std::future::Future;

use starknet_types_core::felt::Felt;
use thiserror::Error;
use url::Url;

use crate::config::{ConfigError, RpcConfig, Settings};
use crate::starknet::fee::Fri;
use crate::starknet::types::{StarknetError, StarknetResult, TransactionReceipt};

pub use funding::{ConsoleFundingGate, FundingError, FundingGate, FundingRequest};
pub use orchestrator::DeployOrchestrator;
pub use poller::ConfirmationPoller;

/// Fatal deployment failures.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Starknet(#[from] StarknetError),

    #[error("funding barrier failed: {0}")]
    Funding(#[from] FundingError),

    #[error("transaction {tx_hash:#x} was rejected{}", reason_suffix(.reason))]
    Rejected {
        tx_hash: Felt,
        reason: Option<String>,
    },

    #[error("deployment cancelled")]
    Cancelled,
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|reason| format!(": {reason}"))
        .unwrap_or_default()
}

/// Non-success endings of a confirmation poll.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("transaction confirmation timeout after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("transaction rejected{}", reason_suffix(.reason))]
    Rejected { reason: Option<String> },

    #[error("polling cancelled")]
    Cancelled,
}

/// Progress of a deployment run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    Init,
    KeysGenerated,
    AddressComputed,
    TxBuilt,
    CredentialsSaved,
    AwaitingFunding,
    Submitted,
    Confirming,
    Confirmed,
    ConfirmationUnknown,
    Reverted,
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeploymentState::Init => "init",
            DeploymentState::KeysGenerated => "keys_generated",
            DeploymentState::AddressComputed => "address_computed",
            DeploymentState::TxBuilt => "tx_built",
            DeploymentState::CredentialsSaved => "credentials_saved",
            DeploymentState::AwaitingFunding => "awaiting_funding",
            DeploymentState::Submitted => "submitted",
            DeploymentState::Confirming => "confirming",
            DeploymentState::Confirmed => "confirmed",
            DeploymentState::ConfirmationUnknown => "confirmation_unknown",
            DeploymentState::Reverted => "reverted",
        };
        f.write_str(name)
    }
}

/// How a submitted deployment ended.
#[derive(Debug, Clone)]
pub enum DeploymentOutcome {
    /// Accepted and executed successfully.
    Confirmed(TransactionReceipt),
    /// Accepted but execution reverted.
    Reverted(TransactionReceipt),
    /// Polling ran out of attempts before a terminal status.
    ConfirmationUnknown,
}

impl DeploymentOutcome {
    /// Whether the binary should exit successfully.
    pub fn is_success(&self) -> bool {
        !matches!(self, DeploymentOutcome::Reverted(_))
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct DeploymentReport {
    pub account_address: Felt,
    pub transaction_hash: Felt,
    pub fee: Fri,
    pub outcome: DeploymentOutcome,
}

/// Resolve the endpoint from `settings` and hand it to `connector`.
///
/// The connector is only invoked once an RPC URL is known.
pub async fn connect_node<C, F, Fut>(settings: &Settings, connector: F) -> Result<(C, Felt), DeployError>
where
    F: FnOnce(Url, RpcConfig) -> Fut,
    Fut: Future<Output = StarknetResult<(C, Felt)>>,
{
    let url = settings.rpc_url()?.clone();
    let (client, chain_id) = connector(url, settings.rpc.clone()).await?;
    Ok((client, chain_id))
}
