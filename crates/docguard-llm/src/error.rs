//! Error types for LLM synthesis.
//!
//! These errors are internal to the synthesizer: every variant resolves to
//! an `LLM_FALLBACK` verdict rather than crossing the component boundary.

use thiserror::Error;

/// LLM interaction errors.
#[derive(Error, Debug)]
pub enum LlmError {
    /// HTTP transport failed.
    #[error("LLM transport error: {0}")]
    Transport(String),

    /// The gateway answered with a non-success status.
    #[error("LLM gateway returned status {status}: {body}")]
    Gateway { status: u16, body: String },

    /// The hard deadline expired.
    #[error("LLM call exceeded the {seconds}s deadline")]
    DeadlineExceeded { seconds: u64 },

    /// The response carried no usable content.
    #[error("LLM response was empty")]
    EmptyResponse,

    /// The response could not be parsed as the required JSON shape.
    #[error("LLM response failed to parse: {0}")]
    Parse(String),
}

/// Result type alias for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;
