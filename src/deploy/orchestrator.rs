//! Deploy-account orchestration.
//!
//! # Responsibilities
//! - Sequence key generation, address precomputation, fee estimation,
//!   the funding barrier, submission and confirmation
//! - Own the operator-facing narrative on the console writer
//! - Downgrade recoverable failures (persistence, confirmation timeout) to warnings
//! - Abort on shutdown during node calls, the funding barrier and polling

use starknet_types_core::felt::Felt;
use std::future::Future;
use std::io::{self, Write};

use crate::config::Settings;
use crate::credentials::{AccountCredentials, EnvCredentialStore};
use crate::deploy::funding::{FundingGate, FundingRequest};
use crate::deploy::poller::ConfirmationPoller;
use crate::deploy::{DeployError, DeploymentOutcome, DeploymentReport, DeploymentState, PollError};
use crate::lifecycle::ShutdownSignal;
use crate::starknet::fee::{overall_fee, resource_bounds_from_estimate, Fri};
use crate::starknet::keys::KeyPair;
use crate::starknet::provider::StarknetRpc;
use crate::starknet::transaction::DeployAccountTransaction;
use crate::starknet::types::{
    felt_to_u128, parse_felt, BlockId, ExecutionStatus, FunctionCall, StarknetError, StarknetResult,
};

/// `starknet_keccak("balanceOf")`
const BALANCE_OF_SELECTOR: Felt =
    Felt::from_hex_unchecked("0x2e4263afad30923c891518314c3c95dbe830a16874e8abc5777a9a20b54c76e");

/// Drives one deploy-account run against `rpc`.
pub struct DeployOrchestrator<'a, R, G, W = io::Stdout> {
    rpc: &'a R,
    chain_id: Felt,
    settings: Settings,
    gate: G,
    out: W,
    shutdown: ShutdownSignal,
    key_pair: Option<KeyPair>,
    state: DeploymentState,
}

impl<'a, R: StarknetRpc, G: FundingGate> DeployOrchestrator<'a, R, G> {
    pub fn new(rpc: &'a R, chain_id: Felt, settings: Settings, gate: G) -> Self {
        Self {
            rpc,
            chain_id,
            settings,
            gate,
            out: io::stdout(),
            shutdown: ShutdownSignal::never(),
            key_pair: None,
            state: DeploymentState::Init,
        }
    }
}

impl<'a, R: StarknetRpc, G: FundingGate, W: Write> DeployOrchestrator<'a, R, G, W> {
    /// Write the console narrative to `out` instead of stdout.
    pub fn with_output<W2: Write>(self, out: W2) -> DeployOrchestrator<'a, R, G, W2> {
        DeployOrchestrator {
            rpc: self.rpc,
            chain_id: self.chain_id,
            settings: self.settings,
            gate: self.gate,
            out,
            shutdown: self.shutdown,
            key_pair: self.key_pair,
            state: self.state,
        }
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Deploy with `key_pair` instead of generating a fresh one.
    pub fn with_key_pair(mut self, key_pair: KeyPair) -> Self {
        self.key_pair = Some(key_pair);
        self
    }

    pub fn state(&self) -> DeploymentState {
        self.state
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn gate(&self) -> &G {
        &self.gate
    }

    fn transition(&mut self, next: DeploymentState) {
        tracing::info!(from = %self.state, to = %next, "Deployment state changed");
        self.state = next;
    }

    /// Run the whole flow.
    pub async fn run(&mut self) -> Result<DeploymentReport, DeployError> {
        let keys = match self.key_pair.take() {
            Some(keys) => keys,
            None => KeyPair::generate(),
        };
        self.transition(DeploymentState::KeysGenerated);
        self.say(format_args!("Generated new keypair"));
        self.say(format_args!("Private key: {:#x}", keys.private_key()));
        self.say(format_args!("Public key: {:#x}", keys.public_key()));

        let class_hash = parse_felt("account class hash", &self.settings.account.class_hash)?;
        let unsigned = DeployAccountTransaction::for_public_key(keys.public_key(), class_hash)
            .with_tip(self.settings.fees.tip);
        let address = unsigned.contract_address();
        self.transition(DeploymentState::AddressComputed);
        self.say(format_args!("Precomputed address: {address:#x}"));

        let rpc = self.rpc;
        let query = unsigned.sign(&keys, self.chain_id, true)?;
        let estimate = self
            .until_cancelled(rpc.estimate_deploy_account_fee(&query))
            .await??;
        let bounds =
            resource_bounds_from_estimate(&estimate, self.settings.fees.bounds_multiplier_percent)?;
        let fee = overall_fee(
            &bounds,
            self.settings.fees.tip,
            self.settings.fees.fee_multiplier_percent,
        )?;
        let transaction = unsigned
            .with_resource_bounds(bounds)
            .sign(&keys, self.chain_id, false)?;
        self.transition(DeploymentState::TxBuilt);
        tracing::info!(
            address = %format!("{address:#x}"),
            estimated_fee_fri = estimate.overall_fee,
            max_fee_fri = fee.0,
            "Deploy transaction built"
        );

        if self.shutdown.is_cancelled() {
            return Err(DeployError::Cancelled);
        }
        self.save_credentials(&AccountCredentials {
            private_key: keys.private_key(),
            public_key: keys.public_key(),
            address,
            class_hash,
        });

        self.transition(DeploymentState::AwaitingFunding);
        let request = FundingRequest {
            address,
            amount: fee,
            faucet_url: self.settings.console.faucet_url.clone(),
        };
        self.say(format_args!("\nThe account needs STRK to deploy."));
        self.say(format_args!("Send at least {} to: {address:#x}", fee));
        self.say(format_args!("You can use the Starknet faucet: {}", request.faucet_url));
        self.say(format_args!("\nPress Enter after funding the account..."));
        self.gate.wait_for_funding(&request).await?;

        if self.settings.fees.check_balance {
            self.check_balance(address, fee).await;
        }

        let submitted = match self
            .until_cancelled(rpc.add_deploy_account_transaction(&transaction))
            .await
        {
            Ok(Ok(submitted)) => submitted,
            Ok(Err(e)) => {
                self.say(format_args!("Error sending transaction: {e}"));
                return Err(e.into());
            }
            Err(cancelled) => {
                tracing::warn!("Submission interrupted, the transaction may still reach the node");
                return Err(cancelled);
            }
        };
        self.transition(DeploymentState::Submitted);
        if submitted.contract_address != address {
            tracing::warn!(
                expected = %format!("{address:#x}"),
                actual = %format!("{:#x}", submitted.contract_address),
                "Node reported a different contract address"
            );
        }
        self.say(format_args!("Deploy transaction submitted!"));
        self.say(format_args!("Transaction hash: {:#x}", submitted.transaction_hash));
        self.say(format_args!("Contract address: {:#x}", submitted.contract_address));

        self.transition(DeploymentState::Confirming);
        let tx_hash = submitted.transaction_hash;
        let outcome = self.confirm(tx_hash).await?;

        Ok(DeploymentReport {
            account_address: address,
            transaction_hash: tx_hash,
            fee,
            outcome,
        })
    }

    /// Await a node call unless shutdown fires first.
    async fn until_cancelled<T>(&self, call: impl Future<Output = T>) -> Result<T, DeployError> {
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            out = call => Ok(out),
            _ = shutdown.cancelled() => Err(DeployError::Cancelled),
        }
    }

    fn save_credentials(&mut self, credentials: &AccountCredentials) {
        let store = EnvCredentialStore::new(&self.settings.credentials.env_file);
        match store.save(credentials.to_entries()) {
            Ok(_) => {
                self.transition(DeploymentState::CredentialsSaved);
                self.say(format_args!("Credentials saved to {}", store.path().display()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Credential persistence failed");
                self.say(format_args!("Warning: Failed to save credentials: {e}"));
            }
        }
    }

    async fn check_balance(&mut self, address: Felt, fee: Fri) {
        let balance = match parse_felt("fee token address", &self.settings.fees.token_address) {
            Ok(token) => fetch_balance(self.rpc, token, address).await,
            Err(e) => Err(e),
        };

        match balance {
            Ok(balance) if balance < fee => {
                tracing::warn!(balance_fri = balance.0, required_fri = fee.0, "Balance below fee");
                self.say(format_args!(
                    "Warning: balance {balance} is below the required {fee}; submitting anyway"
                ));
            }
            Ok(balance) => {
                tracing::info!(balance_fri = balance.0, "Fee token balance checked");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Balance check failed");
            }
        }
    }

    async fn confirm(&mut self, tx_hash: Felt) -> Result<DeploymentOutcome, DeployError> {
        self.say_inline(format_args!("Waiting for confirmation"));

        let mut poller = ConfirmationPoller::from_config(self.rpc, &self.settings.confirmation)
            .with_shutdown(self.shutdown.clone());
        let out = &mut self.out;
        let result = poller
            .poll(tx_hash, |_| {
                let _ = write!(out, ".");
                let _ = out.flush();
            })
            .await;

        match result {
            Ok(receipt) if receipt.execution_status == ExecutionStatus::Reverted => {
                self.transition(DeploymentState::Reverted);
                self.say(format_args!(
                    "\n\nDeployment reverted: {}",
                    receipt.revert_reason.as_deref().unwrap_or("no reason given")
                ));
                Ok(DeploymentOutcome::Reverted(receipt))
            }
            Ok(receipt) => {
                self.transition(DeploymentState::Confirmed);
                self.say(format_args!("\n\nAccount deployed successfully!"));
                if let Some(block_number) = receipt.block_number {
                    self.say(format_args!("Block number: {block_number}"));
                }
                self.say(format_args!("Status: {}", receipt.finality_status));
                Ok(DeploymentOutcome::Confirmed(receipt))
            }
            Err(e @ PollError::Timeout { .. }) => {
                self.transition(DeploymentState::ConfirmationUnknown);
                let explorer_url = self.settings.console.explorer_url.clone();
                self.say(format_args!("\nWarning: Could not confirm transaction: {e}"));
                self.say(format_args!(
                    "Check the transaction status on an explorer: {explorer_url}{tx_hash:#x}"
                ));
                Ok(DeploymentOutcome::ConfirmationUnknown)
            }
            Err(PollError::Rejected { reason }) => {
                self.say(format_args!("\n"));
                Err(DeployError::Rejected { tx_hash, reason })
            }
            Err(PollError::Cancelled) => {
                self.say(format_args!("\n"));
                Err(DeployError::Cancelled)
            }
        }
    }

    fn say(&mut self, line: std::fmt::Arguments<'_>) {
        let _ = writeln!(self.out, "{line}");
    }

    fn say_inline(&mut self, text: std::fmt::Arguments<'_>) {
        let _ = write!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

/// Fee token balance of `owner`, saturating at `u128::MAX`.
pub async fn fetch_balance<R: StarknetRpc>(rpc: &R, token: Felt, owner: Felt) -> StarknetResult<Fri> {
    let call = FunctionCall {
        contract_address: token,
        entry_point_selector: BALANCE_OF_SELECTOR,
        calldata: vec![owner],
    };
    let result = rpc.call(&call, BlockId::Latest).await?;

    // u256 as [low, high]
    let (low, high) = match result.as_slice() {
        [low, high, ..] => (low, high),
        _ => {
            return Err(StarknetError::Decode(format!(
                "balanceOf returned {} values, expected 2",
                result.len()
            )))
        }
    };
    if *high != Felt::ZERO {
        return Ok(Fri(u128::MAX));
    }
    felt_to_u128(low)
        .map(Fri)
        .ok_or_else(|| StarknetError::Decode("balanceOf low word exceeds u128".to_string()))
}
