//! Error types for `teramorph-core`.
//!
//! Storage reasons are kept for logs only. Callers decide what, if
//! anything, to show the client.

use teramorph_storage::StorageError;

/// Errors from the contact submission pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    /// The submitted CSRF token is missing or does not match the session.
    #[error("invalid CSRF token")]
    InvalidCsrf,

    /// No private directory could be located or created for the CSV file.
    #[error("contact storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// The CSV file could not be opened, locked, or written.
    #[error("contact storage write failed: {reason}")]
    StorageWriteFailure { reason: String },
}

impl From<StorageError> for ContactError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable { .. } => Self::StorageUnavailable {
                reason: err.to_string(),
            },
            StorageError::Open { .. }
            | StorageError::Lock { .. }
            | StorageError::Write { .. }
            | StorageError::Task { .. } => Self::StorageWriteFailure {
                reason: err.to_string(),
            },
        }
    }
}
