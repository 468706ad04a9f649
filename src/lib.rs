//! Starknet account bootstrapper library.
//!
//! Generates a keypair, precomputes the account address, estimates the
//! deployment fee, waits for funding, submits the deploy-account transaction
//! and polls it to finality. Also inspects the status of transactions in the
//! latest block.

pub mod config;
pub mod credentials;
pub mod deploy;
pub mod inspect;
pub mod lifecycle;
pub mod observability;
pub mod starknet;

pub use config::Settings;
pub use deploy::{DeployError, DeployOrchestrator, DeploymentOutcome, DeploymentReport};
pub use lifecycle::Shutdown;
