//! Error types for the storage layer.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur in storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend rejected the request. Carries the backend's own message.
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend could not be reached or timed out.
    #[error("network error: {0}")]
    Network(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid backend configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StorageError {
    /// The message to hand back to callers, without the variant prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Backend(msg) | Self::Network(msg) | Self::Config(msg) => msg.clone(),
            Self::Serialization(e) => e.to_string(),
        }
    }
}
