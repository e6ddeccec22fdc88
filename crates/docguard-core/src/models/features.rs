//! Feature vector contracts.
//!
//! Each document kind has a single declared, ordered feature schema: name,
//! index, range, and default per feature. The schema is the source of truth;
//! extractors, the scaler, and the models are validated against it. A vector
//! that violates the schema is a programming error surfaced as
//! [`ContractError`], never a runtime fallback condition.

use serde::Serialize;

use crate::error::{ContractError, ContractResult};

use super::document::DocumentKind;

/// Declared contract for a single feature.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureSpec {
    /// Stable feature name, unique within the schema.
    pub name: &'static str,
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
    /// Value emitted when the underlying field is absent.
    pub default: f64,
}

impl FeatureSpec {
    /// A binary presence/validity feature defaulting to absent.
    pub const fn flag(name: &'static str) -> Self {
        Self {
            name,
            min: 0.0,
            max: 1.0,
            default: 0.0,
        }
    }

    /// A bounded continuous feature.
    pub const fn bounded(name: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self {
            name,
            min,
            max,
            default,
        }
    }

    /// Clamp a raw value into the declared range, mapping non-finite input
    /// to the declared default.
    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.default;
        }
        value.clamp(self.min, self.max)
    }
}

/// The ordered feature schema for one document kind.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSchema {
    kind: DocumentKind,
    specs: &'static [FeatureSpec],
}

impl FeatureSchema {
    /// Declare a schema.
    ///
    /// The declared schemas must match their kind's feature count; that
    /// invariant is pinned by tests against every schema singleton rather
    /// than enforced here, so narrow schemas remain constructible in unit
    /// tests.
    pub const fn new(kind: DocumentKind, specs: &'static [FeatureSpec]) -> Self {
        Self { kind, specs }
    }

    /// The document kind this schema belongs to.
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Declared feature count.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Whether the schema is empty (never true for declared schemas).
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// All specs in declared order.
    pub fn specs(&self) -> &'static [FeatureSpec] {
        self.specs
    }

    /// Look up a feature index by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    /// Validate a raw value slice against the schema.
    pub fn validate(&self, values: &[f64]) -> ContractResult<()> {
        if values.len() != self.specs.len() {
            return Err(ContractError::Length {
                kind: self.kind,
                expected: self.specs.len(),
                actual: values.len(),
            });
        }
        for (spec, &value) in self.specs.iter().zip(values) {
            if !value.is_finite() {
                return Err(ContractError::NonFinite { name: spec.name });
            }
            if value < spec.min || value > spec.max {
                return Err(ContractError::Range {
                    name: spec.name,
                    value,
                    min: spec.min,
                    max: spec.max,
                });
            }
        }
        Ok(())
    }
}

/// A fixed-width numeric vector bound to its declaring schema.
///
/// Created fresh per request by the extractor; immutable thereafter.
#[derive(Debug, Clone)]
pub struct FeatureVector {
    schema: &'static FeatureSchema,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Bind a value vector to its schema, enforcing the contract.
    pub fn new(schema: &'static FeatureSchema, values: Vec<f64>) -> ContractResult<Self> {
        schema.validate(&values)?;
        Ok(Self { schema, values })
    }

    /// The declaring schema.
    pub fn schema(&self) -> &'static FeatureSchema {
        self.schema
    }

    /// The document kind this vector was extracted for.
    pub fn kind(&self) -> DocumentKind {
        self.schema.kind()
    }

    /// Raw values in schema order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Vector width.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector is empty (never true for declared schemas).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by feature name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).map(|i| self.values[i])
    }
}
