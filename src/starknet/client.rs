//! JSON-RPC client for Starknet nodes.
//!
//! # Responsibilities
//! - Speak JSON-RPC 2.0 over HTTP to the configured endpoint
//! - Bound every call with the configured timeout
//! - Map transport failures, timeouts and RPC error objects onto [`StarknetError`]
//! - Perform the chain-ID handshake at construction

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use starknet_types_core::felt::Felt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

use crate::config::RpcConfig;
use crate::starknet::provider::StarknetRpc;
use crate::starknet::transaction::BroadcastedDeployAccountTransaction;
use crate::starknet::types::{
    parse_felt, BlockId, BlockWithTxHashesResult, DeployAccountResult, FeeEstimate, FunctionCall,
    StarknetError, StarknetResult, TransactionReceipt, TransactionStatus,
};

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

impl From<JsonRpcErrorObject> for StarknetError {
    fn from(error: JsonRpcErrorObject) -> Self {
        let data = error.data.map(|data| match data {
            Value::String(text) => text,
            other => other.to_string(),
        });
        StarknetError::Rpc {
            code: error.code,
            message: error.message,
            data,
        }
    }
}

/// Starknet JSON-RPC client over HTTP.
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: Url,
    timeout_secs: u64,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client without contacting the node.
    pub fn new(url: Url, timeout_secs: u64) -> StarknetResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StarknetError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url,
            timeout_secs,
            next_id: AtomicU64::new(1),
        })
    }

    /// Create a client and perform the chain-ID handshake.
    ///
    /// Returns the chain ID reported by the node. A mismatch with
    /// `expected_chain_id` is an error; an unreachable node is an error.
    pub async fn connect(url: Url, config: &RpcConfig) -> StarknetResult<(Self, Felt)> {
        let client = Self::new(url, config.timeout_secs)?;
        let chain_id = client.chain_id().await?;

        if let Some(expected) = &config.expected_chain_id {
            let expected_felt = parse_felt("expected chain ID", expected)?;
            if expected_felt != chain_id {
                return Err(StarknetError::ChainMismatch {
                    expected: expected.clone(),
                    actual: format!("{chain_id:#x}"),
                });
            }
        }

        tracing::info!(
            rpc_url = %client.url,
            chain_id = %format!("{chain_id:#x}"),
            "Starknet client initialized"
        );

        Ok((client, chain_id))
    }

    /// Issue one JSON-RPC call and decode its result.
    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> StarknetResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, "RPC request");

        let exchange = async {
            let response = self
                .http
                .post(self.url.clone())
                .json(&body)
                .send()
                .await
                .map_err(|e| StarknetError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(StarknetError::Transport(format!("HTTP {status}: {text}")));
            }

            response
                .json::<JsonRpcResponse>()
                .await
                .map_err(|e| StarknetError::Decode(format!("{method}: {e}")))
        };

        let response = match timeout(Duration::from_secs(self.timeout_secs), exchange).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(method, timeout_secs = self.timeout_secs, "RPC timeout");
                return Err(StarknetError::Timeout(self.timeout_secs));
            }
        };

        if let Some(error) = response.error {
            tracing::debug!(method, code = error.code, message = %error.message, "RPC error");
            return Err(error.into());
        }

        let result = response
            .result
            .ok_or_else(|| StarknetError::Decode(format!("{method}: response has no result")))?;

        serde_json::from_value(result).map_err(|e| StarknetError::Decode(format!("{method}: {e}")))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl StarknetRpc for JsonRpcClient {
    async fn chain_id(&self) -> StarknetResult<Felt> {
        self.request("starknet_chainId", json!([])).await
    }

    async fn estimate_deploy_account_fee(
        &self,
        transaction: &BroadcastedDeployAccountTransaction,
    ) -> StarknetResult<FeeEstimate> {
        let estimates: Vec<FeeEstimate> = self
            .request(
                "starknet_estimateFee",
                json!({
                    "request": [transaction],
                    "simulation_flags": [],
                    "block_id": BlockId::Latest.to_json(),
                }),
            )
            .await?;

        estimates
            .into_iter()
            .next()
            .ok_or_else(|| StarknetError::Decode("starknet_estimateFee: empty result".to_string()))
    }

    async fn add_deploy_account_transaction(
        &self,
        transaction: &BroadcastedDeployAccountTransaction,
    ) -> StarknetResult<DeployAccountResult> {
        self.request(
            "starknet_addDeployAccountTransaction",
            json!({ "deploy_account_transaction": transaction }),
        )
        .await
    }

    async fn transaction_status(&self, transaction_hash: Felt) -> StarknetResult<TransactionStatus> {
        self.request(
            "starknet_getTransactionStatus",
            json!({ "transaction_hash": transaction_hash }),
        )
        .await
    }

    async fn transaction_receipt(&self, transaction_hash: Felt) -> StarknetResult<TransactionReceipt> {
        self.request(
            "starknet_getTransactionReceipt",
            json!({ "transaction_hash": transaction_hash }),
        )
        .await
    }

    async fn block_with_tx_hashes(&self, block: BlockId) -> StarknetResult<BlockWithTxHashesResult> {
        let raw: Value = self
            .request(
                "starknet_getBlockWithTxHashes",
                json!({ "block_id": block.to_json() }),
            )
            .await?;
        BlockWithTxHashesResult::from_value(raw)
    }

    async fn call(&self, call: &FunctionCall, block: BlockId) -> StarknetResult<Vec<Felt>> {
        self.request(
            "starknet_call",
            json!({ "request": call, "block_id": block.to_json() }),
        )
        .await
    }
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("rpc_url", &self.url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
