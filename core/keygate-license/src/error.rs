//! Error types for the licensing module.

use keygate_storage::StorageError;
use thiserror::Error;

/// Message returned when the normalized email is empty.
pub(crate) const EMAIL_REQUIRED: &str = "Email required";

/// Licensing-specific errors.
///
/// Every failure is scoped to a single request; none is fatal to the process.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// The request is missing required input. The caller should re-prompt.
    #[error("{0}")]
    Validation(String),

    /// The persistence backend failed. Not retried.
    #[error(transparent)]
    Backend(#[from] StorageError),
}

impl LicenseError {
    pub(crate) fn email_required() -> Self {
        Self::Validation(EMAIL_REQUIRED.to_string())
    }

    /// Returns true for input errors (as opposed to backend failures).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The message to show the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Backend(e) => e.message(),
        }
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
