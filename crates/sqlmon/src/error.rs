//! Error types for sqlmon
//!
//! These errors come from the configuration surface only. Errors produced by a
//! wrapped driver are never converted into `SqlmonError`; the proxy hands them
//! back to the caller exactly as the driver returned them.

use thiserror::Error;

/// Result type alias for sqlmon operations
pub type SqlmonResult<T> = Result<T, SqlmonError>;

/// Error types for configuration and operation-name parsing
#[derive(Debug, Error)]
pub enum SqlmonError {
    /// Configuration could not be parsed or failed validation
    #[error("Config error: {0}")]
    Config(String),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation name outside the known taxonomy
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Log level name not understood by `tracing`
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),
}

impl SqlmonError {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an unknown operation error
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownOperation(name.into())
    }

    /// Check if this is an unknown operation error
    pub fn is_unknown_operation(&self) -> bool {
        matches!(self, Self::UnknownOperation(_))
    }
}

impl From<toml::de::Error> for SqlmonError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}
