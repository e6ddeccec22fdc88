//! Error types for fraud scoring.

use std::path::PathBuf;

use thiserror::Error;

use docguard_core::DocumentKind;

/// Scoring errors.
///
/// Artifact variants are raised at construction and are fatal to the
/// process; the remaining variants are fatal per-request.
#[derive(Error, Debug)]
pub enum ScoringError {
    /// A required scaler or regressor artifact is absent.
    #[error("model artifact missing: {path}")]
    ArtifactMissing { path: PathBuf },

    /// An artifact was present but failed validation.
    #[error("model artifact invalid at {path}: {reason}")]
    ArtifactInvalid { path: PathBuf, reason: String },

    /// The scaler or a regressor disagrees with the kind's declared width.
    #[error("model for {kind} expects {expected} features, got {actual}")]
    DimensionMismatch {
        kind: DocumentKind,
        expected: usize,
        actual: usize,
    },

    /// No model set was loaded for the document kind.
    #[error("no model artifacts loaded for document kind {kind}")]
    KindNotLoaded { kind: DocumentKind },

    /// Inference produced NaN or infinity.
    #[error("inference produced a non-finite score for {kind}")]
    NonFiniteScore { kind: DocumentKind },
}

impl ScoringError {
    /// Create an artifact-invalid error.
    pub fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ArtifactInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for scoring operations.
pub type ScoringResult<T> = Result<T, ScoringError>;
