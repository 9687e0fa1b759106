//! Error types for QUARRY operations

use thiserror::Error;

/// Errors raised while decoding filters and query payloads from JSON.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("Expected a JSON object for {context}, got {found}")]
    NotAnObject { context: String, found: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidCombinator { key: String, reason: String },

    #[error("Invalid query parameter {param}: {reason}")]
    InvalidParam { param: String, reason: String },
}

impl DecodeError {
    pub(crate) fn invalid_json(err: serde_json::Error) -> Self {
        DecodeError::InvalidJson {
            reason: err.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to read configuration: {reason}")]
    Unreadable { reason: String },
}

/// Master error type for all QUARRY errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for QUARRY operations.
pub type QueryResult<T> = Result<T, QueryError>;

// =============================================================================
// TESTS
// =============================================================================
