//! Network-facing types and error definitions.
//!
//! Wire shapes follow the Starknet JSON-RPC specification (v0.8+). Numeric
//! quantities that the node encodes as hex strings (`u64`/`u128`) are decoded
//! into native integers; everything that is a field element stays a [`Felt`].

use serde::{Deserialize, Serialize};
use starknet_types_core::felt::Felt;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while talking to a Starknet node or encoding data for it.
#[derive(Debug, Error)]
pub enum StarknetError {
    /// The HTTP request could not be delivered or answered.
    #[error("transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}{}", .data.as_deref().map(|d| format!(" ({d})")).unwrap_or_default())]
    Rpc {
        code: i64,
        message: String,
        data: Option<String>,
    },

    /// The request did not complete within the configured deadline.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node answered, but not with the shape we expected.
    #[error("malformed RPC response: {0}")]
    Decode(String),

    /// A value could not be converted into a field element.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Fee arithmetic left the native integer width.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(String),

    /// Producing a signature failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The node serves a different network than the one configured.
    #[error("chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: String, actual: String },
}

impl StarknetError {
    /// Whether this error came from the network path (as opposed to local encoding).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            StarknetError::Transport(_)
                | StarknetError::Rpc { .. }
                | StarknetError::Timeout(_)
                | StarknetError::Decode(_)
                | StarknetError::ChainMismatch { .. }
        )
    }
}

/// Result type for Starknet operations.
pub type StarknetResult<T> = Result<T, StarknetError>;

/// Parse a hex string (with or without `0x`) into a field element.
///
/// Rejects empty input, non-hex characters and anything wider than 256 bits.
pub fn parse_felt(label: &str, value: &str) -> StarknetResult<Felt> {
    let digits = value
        .trim()
        .strip_prefix("0x")
        .or_else(|| value.trim().strip_prefix("0X"))
        .unwrap_or(value.trim());

    if digits.is_empty() || digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(StarknetError::Encoding(format!(
            "{label} is not a valid field element: '{value}'"
        )));
    }

    Felt::from_hex(&format!("0x{digits}")).map_err(|_| {
        StarknetError::Encoding(format!("{label} is out of field range: '{value}'"))
    })
}

/// Encode an ASCII string of at most 31 bytes as a Cairo short string.
pub fn short_string(text: &str) -> Felt {
    debug_assert!(text.is_ascii() && text.len() <= 31);
    let mut buf = [0u8; 32];
    let bytes = text.as_bytes();
    buf[32 - bytes.len()..].copy_from_slice(bytes);
    Felt::from_bytes_be(&buf)
}

/// Convert a field element to `u128`, or `None` if it does not fit.
pub fn felt_to_u128(value: &Felt) -> Option<u128> {
    let bytes = value.to_bytes_be();
    if bytes[..16].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&bytes[16..]);
    Some(u128::from_be_bytes(low))
}

/// Hex-or-decimal quantity decoding shared by the numeric serde helpers.
fn parse_quantity(raw: &str) -> Result<u128, String> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u128::from_str_radix(hex, 16).map_err(|e| format!("'{raw}': {e}")),
        None => raw.parse::<u128>().map_err(|e| format!("'{raw}': {e}")),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Quantity {
    Number(u64),
    Text(String),
}

impl Quantity {
    fn value(self) -> Result<u128, String> {
        match self {
            Quantity::Number(n) => Ok(n as u128),
            Quantity::Text(s) => parse_quantity(&s),
        }
    }
}

/// Serde helpers for `u64` quantities encoded as hex strings.
pub mod hex_u64 {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let value = super::Quantity::deserialize(deserializer)?
            .value()
            .map_err(D::Error::custom)?;
        u64::try_from(value).map_err(|_| D::Error::custom(format!("{value} exceeds u64")))
    }
}

/// Serde helpers for `u128` quantities encoded as hex strings.
pub mod hex_u128 {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        super::Quantity::deserialize(deserializer)?
            .value()
            .map_err(D::Error::custom)
    }
}

/// Caller-declared limits for one resource kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBounds {
    /// Maximum units of the resource the transaction may consume.
    #[serde(with = "hex_u64")]
    pub max_amount: u64,
    /// Maximum price (in FRI) paid per unit.
    #[serde(with = "hex_u128")]
    pub max_price_per_unit: u128,
}

/// Resource bounds for every resource kind of a V3 transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceBoundsMapping {
    pub l1_gas: ResourceBounds,
    pub l1_data_gas: ResourceBounds,
    pub l2_gas: ResourceBounds,
}

/// Where a transaction's nonce and fee state lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataAvailabilityMode {
    #[default]
    L1,
    L2,
}

impl DataAvailabilityMode {
    pub fn index(self) -> u64 {
        match self {
            DataAvailabilityMode::L1 => 0,
            DataAvailabilityMode::L2 => 1,
        }
    }
}

/// Node-side fee estimate for a single transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeeEstimate {
    #[serde(with = "hex_u64")]
    pub l1_gas_consumed: u64,
    #[serde(with = "hex_u128")]
    pub l1_gas_price: u128,
    #[serde(with = "hex_u64")]
    pub l2_gas_consumed: u64,
    #[serde(with = "hex_u128")]
    pub l2_gas_price: u128,
    #[serde(with = "hex_u64")]
    pub l1_data_gas_consumed: u64,
    #[serde(with = "hex_u128")]
    pub l1_data_gas_price: u128,
    #[serde(with = "hex_u128")]
    pub overall_fee: u128,
    #[serde(default)]
    pub unit: String,
}

/// Settlement progress of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FinalityStatus {
    #[serde(rename = "RECEIVED")]
    Received,
    #[serde(rename = "CANDIDATE")]
    Candidate,
    #[serde(rename = "PRE_CONFIRMED")]
    PreConfirmed,
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "ACCEPTED_ON_L2")]
    AcceptedOnL2,
    #[serde(rename = "ACCEPTED_ON_L1")]
    AcceptedOnL1,
    #[serde(rename = "REJECTED")]
    Rejected,
    #[serde(other)]
    Unknown,
}

impl FinalityStatus {
    /// Accepted on L2 or settled on L1.
    pub fn is_accepted(self) -> bool {
        matches!(self, FinalityStatus::AcceptedOnL2 | FinalityStatus::AcceptedOnL1)
    }

    /// No further transitions will happen.
    pub fn is_terminal(self) -> bool {
        self.is_accepted() || self == FinalityStatus::Rejected
    }
}

impl fmt::Display for FinalityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FinalityStatus::Received => "RECEIVED",
            FinalityStatus::Candidate => "CANDIDATE",
            FinalityStatus::PreConfirmed => "PRE_CONFIRMED",
            FinalityStatus::Pending => "PENDING",
            FinalityStatus::AcceptedOnL2 => "ACCEPTED_ON_L2",
            FinalityStatus::AcceptedOnL1 => "ACCEPTED_ON_L1",
            FinalityStatus::Rejected => "REJECTED",
            FinalityStatus::Unknown => "UNKNOWN",
        };
        f.write_str(text)
    }
}

/// Outcome of executing a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ExecutionStatus {
    #[serde(rename = "SUCCEEDED")]
    Succeeded,
    #[serde(rename = "REVERTED")]
    Reverted,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ExecutionStatus::Succeeded => "SUCCEEDED",
            ExecutionStatus::Reverted => "REVERTED",
            ExecutionStatus::Unknown => "UNKNOWN",
        };
        f.write_str(text)
    }
}

/// Answer of `starknet_getTransactionStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionStatus {
    pub finality_status: FinalityStatus,
    #[serde(default)]
    pub execution_status: Option<ExecutionStatus>,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// Fee actually charged for an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeePayment {
    pub amount: Felt,
    pub unit: String,
}

/// Answer of `starknet_getTransactionReceipt`, reduced to what we report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: Felt,
    #[serde(default)]
    pub contract_address: Option<Felt>,
    #[serde(default)]
    pub block_hash: Option<Felt>,
    #[serde(default)]
    pub block_number: Option<u64>,
    pub finality_status: FinalityStatus,
    pub execution_status: ExecutionStatus,
    #[serde(default)]
    pub revert_reason: Option<String>,
    #[serde(default)]
    pub actual_fee: Option<FeePayment>,
}

/// Answer of `starknet_addDeployAccountTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeployAccountResult {
    pub transaction_hash: Felt,
    pub contract_address: Felt,
}

/// Block selector for state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    Latest,
    PreConfirmed,
    Number(u64),
}

impl BlockId {
    /// JSON-RPC encoding of the selector.
    pub fn to_json(self) -> serde_json::Value {
        match self {
            BlockId::Latest => serde_json::json!("latest"),
            BlockId::PreConfirmed => serde_json::json!("pre_confirmed"),
            BlockId::Number(number) => serde_json::json!({ "block_number": number }),
        }
    }
}

/// A finalized block listing transaction hashes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlockWithTxHashes {
    pub block_hash: Felt,
    pub block_number: u64,
    #[serde(default)]
    pub status: Option<String>,
    pub transactions: Vec<Felt>,
}

/// A block still being built by the sequencer (no hash yet).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PreConfirmedBlockWithTxHashes {
    #[serde(default)]
    pub block_number: Option<u64>,
    pub transactions: Vec<Felt>,
}

/// Either representation of `starknet_getBlockWithTxHashes`. At most one is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockWithTxHashesResult {
    pub block: Option<BlockWithTxHashes>,
    pub pre_confirmed: Option<PreConfirmedBlockWithTxHashes>,
}

impl BlockWithTxHashesResult {
    /// Classify a raw block payload. A payload with a `block_hash` is finalized; one
    /// that only lists `transactions` is pre-confirmed; anything else leaves both empty.
    pub fn from_value(value: serde_json::Value) -> StarknetResult<Self> {
        let Some(object) = value.as_object() else {
            return Ok(Self::default());
        };

        if object.contains_key("block_hash") {
            let block = serde_json::from_value(value)
                .map_err(|e| StarknetError::Decode(format!("block: {e}")))?;
            Ok(Self {
                block: Some(block),
                pre_confirmed: None,
            })
        } else if object.contains_key("transactions") {
            let block = serde_json::from_value(value)
                .map_err(|e| StarknetError::Decode(format!("pre-confirmed block: {e}")))?;
            Ok(Self {
                block: None,
                pre_confirmed: Some(block),
            })
        } else {
            Ok(Self::default())
        }
    }
}

/// A read-only contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    pub contract_address: Felt,
    pub entry_point_selector: Felt,
    pub calldata: Vec<Felt>,
}
