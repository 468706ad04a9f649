//! Transaction status inspection.
//!
//! # Data Flow
//! ```text
//! starknet_getBlockWithTxHashes(latest)
//!     → finalized block, else pre-confirmed block
//!     → first transaction hash
//!     → starknet_getTransactionStatus
//!     → StatusReport
//! ```

pub mod status;

use thiserror::Error;

use crate::starknet::types::StarknetError;

pub use status::{inspect, BlockSource, StatusReport};

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("latest block has neither a finalized nor a pre-confirmed form")]
    UnexpectedBlock,

    #[error("latest block contains no transactions")]
    EmptyBlock,

    #[error(transparent)]
    Rpc(#[from] StarknetError),
}
