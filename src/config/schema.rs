//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the bootstrapper.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// OpenZeppelin account class declared on Sepolia.
pub const DEFAULT_ACCOUNT_CLASS_HASH: &str =
    "0x61dac032f228abef9c6626f995015233097ae253a7f72d68552db02f2971b8f";

/// STRK fee token.
pub const DEFAULT_FEE_TOKEN_ADDRESS: &str =
    "0x04718f5a0fc34cc1af16a1cdee98ffb20c31f5cd61d6ab07201858f4287c938d";

pub const DEFAULT_FAUCET_URL: &str = "https://starknet-faucet.vercel.app/";
pub const DEFAULT_EXPLORER_URL: &str = "https://sepolia.voyager.online/tx/";

/// Root configuration for the bootstrapper.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct Settings {
    /// Node connection.
    pub rpc: RpcConfig,

    /// Account contract class.
    pub account: AccountConfig,

    /// Fee bounds and tip.
    pub fees: FeeConfig,

    /// Confirmation polling.
    pub confirmation: ConfirmationConfig,

    /// Credential file.
    pub credentials: CredentialsConfig,

    /// Operator-facing links.
    pub console: ConsoleConfig,
}

/// Node connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// JSON-RPC endpoint. Only ever taken from `STARKNET_RPC_URL`.
    #[serde(skip)]
    pub url: Option<Url>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,

    /// Refuse to run against any other chain (e.g. "SN_SEPOLIA" as hex).
    pub expected_chain_id: Option<String>,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 30,
            expected_chain_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountConfig {
    pub class_hash: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            class_hash: DEFAULT_ACCOUNT_CLASS_HASH.to_string(),
        }
    }
}

/// Fee configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeeConfig {
    /// Scale applied to the node's estimate when deriving resource bounds (percent).
    pub bounds_multiplier_percent: u32,

    /// Scale applied to the displayed worst-case fee (percent).
    pub fee_multiplier_percent: u32,

    /// Tip per unit of L2 gas, in FRI.
    pub tip: u64,

    /// Token whose balance is checked before submitting.
    pub token_address: String,

    /// Check the fee token balance after the funding barrier.
    pub check_balance: bool,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            bounds_multiplier_percent: 150,
            fee_multiplier_percent: 100,
            tip: 0,
            token_address: DEFAULT_FEE_TOKEN_ADDRESS.to_string(),
            check_balance: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConfirmationConfig {
    pub poll_interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for ConfirmationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 5,
            max_attempts: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Read at startup for `STARKNET_RPC_URL`, written with the new account.
    pub env_file: PathBuf,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            env_file: PathBuf::from(".env"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub faucet_url: String,

    /// Prefix for transaction links; the hash is appended.
    pub explorer_url: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            faucet_url: DEFAULT_FAUCET_URL.to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }
}
