//! # docguard-scoring
//!
//! Ensemble fraud scoring for the docguard pipeline.
//!
//! The scorer maps a declared-width feature vector to an [`MlAnalysis`]:
//! scale with the persisted scaler, predict with two tree regressors,
//! combine with per-kind ensemble weights, then apply the hard validation
//! rules that monotonically raise the score for specific violations.
//! Missing or invalid artifacts are fatal at construction; per-request
//! failures surface as [`ScoringError`] and are never papered over with a
//! default score.
//!
//! [`MlAnalysis`]: docguard_core::MlAnalysis

pub mod artifacts;
mod error;
pub mod rules;
mod scorer;

pub use error::*;
pub use scorer::*;
