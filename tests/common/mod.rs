//! Shared utilities for integration tests.
#![allow(dead_code)]

use serde_json::Value;
use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use account_bootstrap::deploy::{FundingError, FundingGate, FundingRequest};
use account_bootstrap::starknet::address::precompute_address;
use account_bootstrap::starknet::provider::StarknetRpc;
use account_bootstrap::starknet::transaction::BroadcastedDeployAccountTransaction;
use account_bootstrap::starknet::types::{
    BlockId, BlockWithTxHashesResult, DeployAccountResult, ExecutionStatus, FeeEstimate,
    FinalityStatus, FunctionCall, StarknetError, StarknetResult, TransactionReceipt,
    TransactionStatus,
};
use account_bootstrap::starknet::Felt;

pub const SN_SEPOLIA: Felt = Felt::from_hex_unchecked("0x534e5f5345504f4c4941");
pub const SUBMITTED_TX_HASH: Felt = Felt::from_hex_unchecked("0x7a11ce");

/// A scripted step of `starknet_getTransactionStatus`.
#[derive(Debug, Clone)]
pub enum StatusStep {
    Status(FinalityStatus),
    Rejected(&'static str),
    LookupError,
}

/// In-process node with scripted answers and per-method call counters.
pub struct MockNode {
    pub chain_id: Felt,
    pub estimate: FeeEstimate,
    pub estimate_error: Option<&'static str>,
    pub estimate_delay: Option<Duration>,
    pub submit_error: Option<&'static str>,
    statuses: Mutex<VecDeque<StatusStep>>,
    fallback_status: FinalityStatus,
    pub execution_status: ExecutionStatus,
    pub receipt_available: bool,
    pub block: Mutex<Value>,
    pub balance: Option<Vec<Felt>>,

    pub estimate_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub receipt_calls: AtomicUsize,
    pub block_calls: AtomicUsize,
    pub call_calls: AtomicUsize,

    pub estimated: Mutex<Vec<BroadcastedDeployAccountTransaction>>,
    pub submitted: Mutex<Vec<BroadcastedDeployAccountTransaction>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self {
            chain_id: SN_SEPOLIA,
            estimate: sample_estimate(),
            estimate_error: None,
            estimate_delay: None,
            submit_error: None,
            statuses: Mutex::new(VecDeque::new()),
            fallback_status: FinalityStatus::Received,
            execution_status: ExecutionStatus::Succeeded,
            receipt_available: true,
            block: Mutex::new(Value::Null),
            balance: None,
            estimate_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            receipt_calls: AtomicUsize::new(0),
            block_calls: AtomicUsize::new(0),
            call_calls: AtomicUsize::new(0),
            estimated: Mutex::new(Vec::new()),
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Answer the given steps in order, then `fallback` forever.
    pub fn with_statuses(mut self, steps: Vec<StatusStep>, fallback: FinalityStatus) -> Self {
        self.statuses = Mutex::new(steps.into());
        self.fallback_status = fallback;
        self
    }

    /// `attempts - 1` pending answers followed by ACCEPTED_ON_L2.
    pub fn accepted_after(attempts: usize) -> Self {
        let mut steps = vec![StatusStep::Status(FinalityStatus::Received); attempts - 1];
        steps.push(StatusStep::Status(FinalityStatus::AcceptedOnL2));
        Self::new().with_statuses(steps, FinalityStatus::AcceptedOnL2)
    }

    pub fn with_block(self, block: Value) -> Self {
        *self.block.lock().unwrap() = block;
        self
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl StarknetRpc for MockNode {
    async fn chain_id(&self) -> StarknetResult<Felt> {
        Ok(self.chain_id)
    }

    async fn estimate_deploy_account_fee(
        &self,
        transaction: &BroadcastedDeployAccountTransaction,
    ) -> StarknetResult<FeeEstimate> {
        self.estimate_calls.fetch_add(1, Ordering::SeqCst);
        self.estimated.lock().unwrap().push(transaction.clone());

        if let Some(delay) = self.estimate_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = self.estimate_error {
            return Err(StarknetError::Rpc {
                code: 41,
                message: message.to_string(),
                data: None,
            });
        }
        Ok(self.estimate.clone())
    }

    async fn add_deploy_account_transaction(
        &self,
        transaction: &BroadcastedDeployAccountTransaction,
    ) -> StarknetResult<DeployAccountResult> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(transaction.clone());

        if let Some(message) = self.submit_error {
            return Err(StarknetError::Rpc {
                code: 55,
                message: message.to_string(),
                data: None,
            });
        }

        Ok(DeployAccountResult {
            transaction_hash: SUBMITTED_TX_HASH,
            contract_address: precompute_address(
                transaction.class_hash,
                transaction.contract_address_salt,
                &transaction.constructor_calldata,
                Felt::ZERO,
            ),
        })
    }

    async fn transaction_status(&self, _transaction_hash: Felt) -> StarknetResult<TransactionStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(StatusStep::Status(self.fallback_status));

        match step {
            StatusStep::Status(finality_status) => Ok(TransactionStatus {
                finality_status,
                execution_status: finality_status
                    .is_accepted()
                    .then_some(self.execution_status),
                failure_reason: None,
            }),
            StatusStep::Rejected(reason) => Ok(TransactionStatus {
                finality_status: FinalityStatus::Rejected,
                execution_status: None,
                failure_reason: Some(reason.to_string()),
            }),
            StatusStep::LookupError => Err(StarknetError::Rpc {
                code: 29,
                message: "Transaction hash not found".to_string(),
                data: None,
            }),
        }
    }

    async fn transaction_receipt(&self, transaction_hash: Felt) -> StarknetResult<TransactionReceipt> {
        self.receipt_calls.fetch_add(1, Ordering::SeqCst);
        if !self.receipt_available {
            return Err(StarknetError::Transport("connection reset".to_string()));
        }
        Ok(TransactionReceipt {
            transaction_hash,
            contract_address: None,
            block_hash: Some(Felt::from(0xb10cu64)),
            block_number: Some(123_456),
            finality_status: FinalityStatus::AcceptedOnL2,
            execution_status: self.execution_status,
            revert_reason: (self.execution_status == ExecutionStatus::Reverted)
                .then(|| "Insufficient balance".to_string()),
            actual_fee: None,
        })
    }

    async fn block_with_tx_hashes(&self, _block: BlockId) -> StarknetResult<BlockWithTxHashesResult> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        BlockWithTxHashesResult::from_value(self.block.lock().unwrap().clone())
    }

    async fn call(&self, _call: &FunctionCall, _block: BlockId) -> StarknetResult<Vec<Felt>> {
        self.call_calls.fetch_add(1, Ordering::SeqCst);
        self.balance
            .clone()
            .ok_or_else(|| StarknetError::Transport("call not scripted".to_string()))
    }
}

/// 1000 units of each gas kind at 10^9 FRI.
pub fn sample_estimate() -> FeeEstimate {
    FeeEstimate {
        l1_gas_consumed: 0,
        l1_gas_price: 1_000_000_000,
        l2_gas_consumed: 1000,
        l2_gas_price: 1_000_000_000,
        l1_data_gas_consumed: 128,
        l1_data_gas_price: 1_000,
        overall_fee: 1_000_128_000_000,
        unit: "FRI".to_string(),
    }
}

/// Funding gate that opens immediately and records how often it was asked.
#[derive(Default)]
pub struct StubGate {
    pub requests: Vec<FundingRequest>,
}

impl FundingGate for StubGate {
    async fn wait_for_funding(&mut self, request: &FundingRequest) -> Result<(), FundingError> {
        self.requests.push(request.clone());
        Ok(())
    }
}

/// Start a programmable JSON-RPC endpoint on an ephemeral port.
///
/// `handler` receives the method and params of every request and returns an
/// HTTP status with a raw body.
pub async fn start_rpc_backend<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(String, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_json_body(&mut socket).await else {
                            return;
                        };
                        let method = request["method"].as_str().unwrap_or_default().to_string();
                        let params = request["params"].clone();
                        let (status, body) = handler(method, params).await;
                        let status_text = match status {
                            200 => "200 OK",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// JSON-RPC success envelope around `result`.
pub fn rpc_result(result: Value) -> (u16, String) {
    let body = serde_json::json!({ "jsonrpc": "2.0", "id": 1, "result": result });
    (200, body.to_string())
}

/// JSON-RPC error envelope.
pub fn rpc_error(code: i64, message: &str) -> (u16, String) {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "error": { "code": code, "message": message }
    });
    (200, body.to_string())
}

async fn read_json_body(socket: &mut tokio::net::TcpStream) -> Option<Value> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buffer[..header_end]).to_ascii_lowercase();
    let content_length: usize = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    serde_json::from_slice(&buffer[header_end..header_end + content_length]).ok()
}
