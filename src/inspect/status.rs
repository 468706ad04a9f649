//! Status lookup for a single transaction.

use starknet_types_core::felt::Felt;
use std::fmt;

use crate::inspect::InspectError;
use crate::starknet::provider::StarknetRpc;
use crate::starknet::types::{BlockId, ExecutionStatus, FinalityStatus};

/// Which block representation the transaction was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSource {
    Finalized { block_number: u64 },
    PreConfirmed,
}

/// Result of an inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub transaction_hash: Felt,
    pub source: Option<BlockSource>,
    pub finality_status: FinalityStatus,
    pub execution_status: Option<ExecutionStatus>,
    pub failure_reason: Option<String>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Some(BlockSource::Finalized { block_number }) => {
                writeln!(f, "Latest block: {block_number}")?
            }
            Some(BlockSource::PreConfirmed) => writeln!(f, "Latest block: pre-confirmed")?,
            None => {}
        }
        writeln!(f, "Transaction hash: {:#x}", self.transaction_hash)?;
        writeln!(f, "Finality status: {}", self.finality_status)?;
        match self.execution_status {
            Some(status) => writeln!(f, "Execution status: {status}")?,
            None => writeln!(f, "Execution status: not yet executed")?,
        }
        if let Some(reason) = &self.failure_reason {
            writeln!(f, "Failure reason: {reason}")?;
        }
        Ok(())
    }
}

/// Pick the first transaction of the latest block.
///
/// The finalized representation wins over the pre-confirmed one.
pub async fn first_transaction_of_latest_block<R: StarknetRpc>(
    rpc: &R,
) -> Result<(Felt, BlockSource), InspectError> {
    let result = rpc.block_with_tx_hashes(BlockId::Latest).await?;

    let (transactions, source) = match (result.block, result.pre_confirmed) {
        (Some(block), _) => (
            block.transactions,
            BlockSource::Finalized {
                block_number: block.block_number,
            },
        ),
        (None, Some(pre_confirmed)) => (pre_confirmed.transactions, BlockSource::PreConfirmed),
        (None, None) => return Err(InspectError::UnexpectedBlock),
    };

    let first = transactions
        .first()
        .copied()
        .ok_or(InspectError::EmptyBlock)?;

    tracing::debug!(
        tx_hash = %format!("{first:#x}"),
        transactions = transactions.len(),
        "Selected first transaction of latest block"
    );
    Ok((first, source))
}

/// Status of `tx_hash`.
pub async fn transaction_status_report<R: StarknetRpc>(
    rpc: &R,
    tx_hash: Felt,
    source: Option<BlockSource>,
) -> Result<StatusReport, InspectError> {
    let status = rpc.transaction_status(tx_hash).await?;
    tracing::info!(
        tx_hash = %format!("{tx_hash:#x}"),
        finality_status = %status.finality_status,
        "Transaction status fetched"
    );

    Ok(StatusReport {
        transaction_hash: tx_hash,
        source,
        finality_status: status.finality_status,
        execution_status: status.execution_status,
        failure_reason: status.failure_reason,
    })
}

/// Inspect `tx_hash`, or the first transaction of the latest block when `None`.
pub async fn inspect<R: StarknetRpc>(
    rpc: &R,
    tx_hash: Option<Felt>,
) -> Result<StatusReport, InspectError> {
    match tx_hash {
        Some(hash) => transaction_status_report(rpc, hash, None).await,
        None => {
            let (hash, source) = first_transaction_of_latest_block(rpc).await?;
            transaction_status_report(rpc, hash, Some(source)).await
        }
    }
}
