//! Cache error types.

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No live entry exists for the key.
    #[error("Cache key not found: {key}")]
    NotFound { key: String },

    /// The value could not be encoded, or the stored bytes could not be
    /// decoded into the requested type.
    #[error("Serialization error for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Connectivity or protocol failure talking to the backend.
    #[error("Cache {operation} failed for key '{key}': {message}")]
    Backend {
        operation: &'static str,
        key: String,
        message: String,
    },

    /// The context deadline passed before the operation completed.
    #[error("Cache {operation} timed out")]
    Timeout { operation: &'static str },

    /// The context was cancelled before the operation completed.
    #[error("Cache {operation} cancelled")]
    Cancelled { operation: &'static str },

    /// Fatal construction-time failure, such as an unreachable backend.
    #[error("Cache configuration error: {0}")]
    Configuration(String),
}

impl CacheError {
    pub fn backend(operation: &'static str, key: impl Into<String>, message: impl ToString) -> Self {
        CacheError::Backend {
            operation,
            key: key.into(),
            message: message.to_string(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        CacheError::NotFound { key: key.into() }
    }

    /// Whether this error means the key has no live entry.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }
}
