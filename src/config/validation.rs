//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, multipliers >= 100)
//! - Check that hex fields parse as field elements
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Settings → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::Settings;
use crate::starknet::types::parse_felt;

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate settings, collecting every error.
pub fn validate_config(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if settings.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be greater than 0"));
    }
    if let Some(chain_id) = &settings.rpc.expected_chain_id {
        if let Err(e) = parse_felt("rpc.expected_chain_id", chain_id) {
            errors.push(ValidationError::new("rpc.expected_chain_id", e.to_string()));
        }
    }

    if let Err(e) = parse_felt("account.class_hash", &settings.account.class_hash) {
        errors.push(ValidationError::new("account.class_hash", e.to_string()));
    }

    if settings.fees.bounds_multiplier_percent < 100 {
        errors.push(ValidationError::new(
            "fees.bounds_multiplier_percent",
            "must be at least 100",
        ));
    }
    if settings.fees.fee_multiplier_percent < 100 {
        errors.push(ValidationError::new(
            "fees.fee_multiplier_percent",
            "must be at least 100",
        ));
    }
    if let Err(e) = parse_felt("fees.token_address", &settings.fees.token_address) {
        errors.push(ValidationError::new("fees.token_address", e.to_string()));
    }

    if settings.confirmation.poll_interval_secs == 0 {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_secs",
            "must be greater than 0",
        ));
    }
    if settings.confirmation.max_attempts == 0 {
        errors.push(ValidationError::new(
            "confirmation.max_attempts",
            "must be greater than 0",
        ));
    }

    if settings.credentials.env_file.as_os_str().is_empty() {
        errors.push(ValidationError::new("credentials.env_file", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
