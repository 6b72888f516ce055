//! Error types for sqlshift.

use thiserror::Error;

use crate::dialect::Dialect;

/// The main error type for sqlshift operations.
#[derive(Debug, Error)]
pub enum TranspileError {
    /// The input could not be split into tokens.
    #[error("Tokenize error at position {position}: {message}")]
    Tokenize { position: usize, message: String },

    /// Failed to parse the token stream.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// The construct has no equivalent in the target dialect.
    #[error("Unsupported in {dialect}: {feature}")]
    Unsupported { dialect: Dialect, feature: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranspileError {
    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create a tokenize error at the given position.
    pub fn tokenize(position: usize, message: impl Into<String>) -> Self {
        Self::Tokenize {
            position,
            message: message.into(),
        }
    }

    /// Create an unsupported-feature error for a dialect.
    pub fn unsupported(dialect: Dialect, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }
}

/// Result type alias for sqlshift operations.
pub type TranspileResult<T> = Result<T, TranspileError>;
