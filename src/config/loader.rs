//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::config::schema::Settings;
use crate::config::validation::{validate_config, ValidationError};
use crate::credentials::env_file;

/// Environment variable holding the node endpoint.
pub const RPC_URL_VAR: &str = "STARKNET_RPC_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("STARKNET_RPC_URL environment variable is not set")]
    MissingRpcUrl,

    #[error("STARKNET_RPC_URL is not a valid http(s) URL: '{value}'")]
    InvalidRpcUrl { value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Command-line values that win over every other layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub env_file: Option<PathBuf>,
    pub class_hash: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub max_attempts: Option<u32>,
}

/// Load settings using the process environment.
pub fn load_config(config_path: Option<&Path>, overrides: &Overrides) -> Result<Settings, ConfigError> {
    load_config_with_env(config_path, overrides, |key| std::env::var(key).ok())
}

/// Load settings with an explicit environment lookup.
///
/// Layers, lowest to highest: defaults, TOML file, `.env` file, `env_lookup`,
/// `overrides`. The result is validated and always carries an RPC URL.
pub fn load_config_with_env<F>(
    config_path: Option<&Path>,
    overrides: &Overrides,
    env_lookup: F,
) -> Result<Settings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = match config_path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&content)?
        }
        None => Settings::default(),
    };

    if let Some(env_file) = &overrides.env_file {
        settings.credentials.env_file = env_file.clone();
    }

    let env_path = settings.credentials.env_file.clone();
    let dotenv = env_file::read(&env_path).map_err(|source| ConfigError::Io {
        path: env_path.clone(),
        source,
    })?;
    if dotenv.is_empty() {
        tracing::debug!(path = %env_path.display(), "No .env entries found, using process environment");
    }

    let raw_url = env_lookup(RPC_URL_VAR)
        .or_else(|| dotenv.get(RPC_URL_VAR).cloned())
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingRpcUrl)?;
    settings.rpc.url = Some(parse_rpc_url(&raw_url)?);

    if let Some(class_hash) = &overrides.class_hash {
        settings.account.class_hash = class_hash.clone();
    }
    if let Some(interval) = overrides.poll_interval_secs {
        settings.confirmation.poll_interval_secs = interval;
    }
    if let Some(attempts) = overrides.max_attempts {
        settings.confirmation.max_attempts = attempts;
    }

    validate_config(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}

fn parse_rpc_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidRpcUrl {
        value: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}

impl Settings {
    /// Endpoint resolved by the loader.
    pub fn rpc_url(&self) -> Result<&Url, ConfigError> {
        self.rpc.url.as_ref().ok_or(ConfigError::MissingRpcUrl)
    }
}
