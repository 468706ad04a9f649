//! Confirmation polling for submitted transactions.
//!
//! # Responsibilities
//! - Query the transaction status at a fixed interval
//! - Stop on acceptance (returning the receipt), rejection, timeout or cancellation
//! - Report each non-terminal attempt through a progress callback

use starknet_types_core::felt::Felt;
use std::time::Duration;

use crate::config::ConfirmationConfig;
use crate::deploy::PollError;
use crate::lifecycle::ShutdownSignal;
use crate::starknet::provider::StarknetRpc;
use crate::starknet::types::{FinalityStatus, TransactionReceipt};

/// Bounded, cancellable status poller.
pub struct ConfirmationPoller<'a, R> {
    rpc: &'a R,
    interval: Duration,
    max_attempts: u32,
    shutdown: ShutdownSignal,
}

impl<'a, R: StarknetRpc> ConfirmationPoller<'a, R> {
    pub fn new(rpc: &'a R, interval: Duration, max_attempts: u32) -> Self {
        Self {
            rpc,
            interval,
            max_attempts,
            shutdown: ShutdownSignal::never(),
        }
    }

    pub fn from_config(rpc: &'a R, config: &ConfirmationConfig) -> Self {
        Self::new(
            rpc,
            Duration::from_secs(config.poll_interval_secs),
            config.max_attempts,
        )
    }

    /// Abort the poll when `shutdown` fires.
    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Poll until `tx_hash` reaches a terminal status.
    ///
    /// Issues at most `max_attempts` status queries. Lookup errors count as
    /// attempts and are retried. `on_progress` is called with the attempt
    /// number after every non-terminal attempt.
    pub async fn poll<P>(&mut self, tx_hash: Felt, mut on_progress: P) -> Result<TransactionReceipt, PollError>
    where
        P: FnMut(u32),
    {
        for attempt in 1..=self.max_attempts {
            if self.shutdown.is_cancelled() {
                return Err(PollError::Cancelled);
            }

            match self.rpc.transaction_status(tx_hash).await {
                Ok(status) if status.finality_status == FinalityStatus::Rejected => {
                    tracing::warn!(
                        tx_hash = %format!("{tx_hash:#x}"),
                        attempt,
                        reason = status.failure_reason.as_deref().unwrap_or("unknown"),
                        "Transaction rejected"
                    );
                    return Err(PollError::Rejected {
                        reason: status.failure_reason,
                    });
                }
                Ok(status) if status.finality_status.is_accepted() => {
                    match self.rpc.transaction_receipt(tx_hash).await {
                        Ok(receipt) => {
                            tracing::info!(
                                tx_hash = %format!("{tx_hash:#x}"),
                                attempt,
                                finality_status = %receipt.finality_status,
                                "Transaction accepted"
                            );
                            return Ok(receipt);
                        }
                        Err(e) => {
                            tracing::debug!(
                                tx_hash = %format!("{tx_hash:#x}"),
                                attempt,
                                error = %e,
                                "Receipt not available yet"
                            );
                        }
                    }
                }
                Ok(status) => {
                    tracing::debug!(
                        tx_hash = %format!("{tx_hash:#x}"),
                        attempt,
                        finality_status = %status.finality_status,
                        "Transaction pending"
                    );
                }
                Err(e) => {
                    tracing::debug!(
                        tx_hash = %format!("{tx_hash:#x}"),
                        attempt,
                        error = %e,
                        "Status lookup failed, retrying"
                    );
                }
            }

            on_progress(attempt);

            if attempt < self.max_attempts {
                tokio::select! {
                    _ = tokio::time::sleep(self.interval) => {}
                    _ = self.shutdown.cancelled() => return Err(PollError::Cancelled),
                }
            }
        }

        tracing::warn!(
            tx_hash = %format!("{tx_hash:#x}"),
            attempts = self.max_attempts,
            "Confirmation timeout"
        );
        Err(PollError::Timeout {
            attempts: self.max_attempts,
        })
    }
}
