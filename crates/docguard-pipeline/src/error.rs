//! Pipeline error type.

use thiserror::Error;

use docguard_core::{ContractError, DocumentKind};
use docguard_history::HistoryError;
use docguard_scoring::ScoringError;

/// Per-request pipeline failures.
///
/// These are the only errors that cross the component boundary: feature
/// contract violations, scoring failures, and a failed history commit.
/// LLM failures never appear here; they resolve to fallback verdicts
/// inside the synthesizer.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The document kind is disabled by configuration.
    #[error("document kind {kind} is disabled by configuration")]
    KindDisabled { kind: DocumentKind },

    /// The extractor violated the feature-vector contract.
    #[error(transparent)]
    FeatureContract(#[from] ContractError),

    /// Scoring failed.
    #[error(transparent)]
    Scoring(#[from] ScoringError),

    /// The decision was computed but could not be committed; callers must
    /// retry idempotently.
    #[error("history commit failed: {0}")]
    HistoryCommit(#[source] HistoryError),
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
