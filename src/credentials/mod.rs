//! Credential persistence.
//!
//! # Data Flow
//! ```text
//! orchestrator (generated keys + address)
//!     → store.rs (read existing file, merge, atomic write)
//!     → env_file.rs (KEY=VALUE parsing and rendering)
//! ```
//!
//! # Design Decisions
//! - Read-merge-write: keys this tool does not own survive every save
//! - Output sorted by key for reproducible files and diffs, operator comments
//!   kept above the entries
//! - A failed save is a warning for the caller, never a panic

pub mod env_file;
pub mod store;

pub use env_file::EnvMap;
pub use store::{merge, AccountCredentials, CredentialError, EnvCredentialStore};
