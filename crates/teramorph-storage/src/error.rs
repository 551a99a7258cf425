//! Storage error types.
//!
//! Variants carry the path and OS reason for operator logs. None of this
//! text is meant for HTTP clients; the server maps every variant to a
//! generic message.

/// Errors that can occur while appending contact rows.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No private directory could be located or created.
    #[error("no usable private directory under '{root}': {reason}")]
    Unavailable { root: String, reason: String },

    /// The CSV file could not be opened for append.
    #[error("failed to open '{path}': {reason}")]
    Open { path: String, reason: String },

    /// The exclusive advisory lock could not be acquired or released.
    #[error("failed to lock '{path}': {reason}")]
    Lock { path: String, reason: String },

    /// Writing the header or the data row failed.
    #[error("failed to write '{path}': {reason}")]
    Write { path: String, reason: String },

    /// The blocking I/O task panicked or was cancelled.
    #[error("storage task failed: {reason}")]
    Task { reason: String },
}
