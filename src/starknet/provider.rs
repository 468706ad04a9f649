//! The node operations the deploy and inspect flows depend on.

use starknet_types_core::felt::Felt;

use crate::starknet::transaction::BroadcastedDeployAccountTransaction;
use crate::starknet::types::{
    BlockId, BlockWithTxHashesResult, DeployAccountResult, FeeEstimate, FunctionCall,
    StarknetResult, TransactionReceipt, TransactionStatus,
};

/// A Starknet JSON-RPC node.
///
/// Implemented by [`crate::starknet::JsonRpcClient`] for real nodes and by
/// scripted stubs in tests.
#[allow(async_fn_in_trait)]
pub trait StarknetRpc {
    /// `starknet_chainId`
    async fn chain_id(&self) -> StarknetResult<Felt>;

    /// `starknet_estimateFee` for a single query-version deploy-account transaction.
    async fn estimate_deploy_account_fee(
        &self,
        transaction: &BroadcastedDeployAccountTransaction,
    ) -> StarknetResult<FeeEstimate>;

    /// `starknet_addDeployAccountTransaction`
    async fn add_deploy_account_transaction(
        &self,
        transaction: &BroadcastedDeployAccountTransaction,
    ) -> StarknetResult<DeployAccountResult>;

    /// `starknet_getTransactionStatus`
    async fn transaction_status(&self, transaction_hash: Felt) -> StarknetResult<TransactionStatus>;

    /// `starknet_getTransactionReceipt`
    async fn transaction_receipt(&self, transaction_hash: Felt) -> StarknetResult<TransactionReceipt>;

    /// `starknet_getBlockWithTxHashes`
    async fn block_with_tx_hashes(&self, block: BlockId) -> StarknetResult<BlockWithTxHashesResult>;

    /// `starknet_call`
    async fn call(&self, call: &FunctionCall, block: BlockId) -> StarknetResult<Vec<Felt>>;
}
