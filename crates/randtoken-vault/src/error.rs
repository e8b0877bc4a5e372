//! Error types for the vault crate.

use thiserror::Error;

/// Errors raised by the in-memory store and its durable backing files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this sequence id is already present.
    #[error("sequence id already exists: {0}")]
    DuplicateKey(String),

    /// IO error (reading or writing the store file or an export artifact).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize or deserialize persisted state.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The existing store file could not be loaded or moved aside, so it
    /// must not be overwritten.
    #[error("token store {} could not be loaded; refusing to overwrite it", .0.display())]
    Unreadable(std::path::PathBuf),
}

/// Errors returned by [`LifecycleManager`](crate::LifecycleManager) operations.
///
/// Confirmation prompts are not errors; see
/// [`ExportOutcome::ConfirmationRequired`](crate::ExportOutcome::ConfirmationRequired).
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A required argument was missing, empty or malformed.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A record with this sequence id already exists.
    #[error("sequence id already exists: {0}")]
    DuplicateId(String),

    /// No record with this sequence id exists.
    #[error("no token record for sequence id: {0}")]
    NotFound(String),

    /// The guard password does not match the record.
    #[error("password does not match")]
    AuthFailed,

    /// Reading or writing durable state failed.
    #[error("storage error: {0}")]
    Storage(StoreError),

    /// Unexpected failure inside the core.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LifecycleError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(id) => Self::DuplicateId(id),
            other => Self::Storage(other),
        }
    }
}
