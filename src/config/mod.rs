//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file
//!     → .env file (KEY=VALUE)
//!     → process environment (wins over .env)
//!     → CLI overrides
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable, threaded through the run)
//! ```
//!
//! # Design Decisions
//! - Config is loaded once; nothing writes back into the process environment
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with_env, ConfigError, Overrides};
pub use schema::{
    AccountConfig, ConfirmationConfig, ConsoleConfig, CredentialsConfig, FeeConfig, RpcConfig,
    Settings,
};
