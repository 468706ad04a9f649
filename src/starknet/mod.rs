//! Starknet integration subsystem.
//!
//! # Data Flow
//! ```text
//! keys.rs (keypair generation, signing)
//!     → address.rs (deterministic account address)
//!     → transaction.rs (deploy-account envelope, hash, signature)
//!     → fee.rs (resource bounds, worst-case fee in FRI/STRK)
//!     → client.rs (JSON-RPC round-trips with timeouts)
//! ```
//!
//! # Security Constraints
//! - Private keys never go through `tracing`
//! - All RPC calls have configurable timeouts
//! - Fee math is integer-only

pub mod address;
pub mod client;
pub mod fee;
pub mod keys;
pub mod provider;
pub mod transaction;
pub mod types;

pub use client::JsonRpcClient;
pub use keys::KeyPair;
pub use provider::StarknetRpc;
pub use types::{StarknetError, StarknetResult};

/// Re-exported field element type.
pub use starknet_types_core::felt::Felt;
