//! Error types for history stores.

use thiserror::Error;

/// History store errors.
///
/// Read-path failures may be degraded by the caller (treat the record as
/// new, log the degradation); a commit failure is fatal per-request and
/// callers must retry idempotently.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Backing store I/O failed.
    #[error("history store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state could not be serialized or deserialized.
    #[error("history store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Interior state was poisoned by a panicked writer.
    #[error("history store lock poisoned")]
    Poisoned,
}

/// Result type alias for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
