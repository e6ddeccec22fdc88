//! Shared error types for the docguard core contracts.

use thiserror::Error;

use crate::models::DocumentKind;

/// Violation of a feature-vector contract.
///
/// A contract violation is a programming error in an extractor, not a
/// recoverable runtime condition: extractors must reach the declared vector
/// length through documented defaults, and must clamp every value into its
/// declared range before handing the vector over.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContractError {
    /// The vector length does not match the declared feature count.
    #[error("feature vector for {kind} has {actual} features, schema declares {expected}")]
    Length {
        kind: DocumentKind,
        expected: usize,
        actual: usize,
    },

    /// A feature value falls outside its declared range.
    #[error("feature `{name}` value {value} outside declared range [{min}, {max}]")]
    Range {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A feature value is NaN or infinite.
    #[error("feature `{name}` is not a finite number")]
    NonFinite { name: &'static str },
}

/// Result type alias for contract checks.
pub type ContractResult<T> = Result<T, ContractError>;
