//! Verdicts and the emitted decision record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::analysis::MlAnalysis;
use super::customer::CustomerClass;

/// The trichotomous pipeline decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Approve,
    Escalate,
    Reject,
}

impl Decision {
    /// Uppercase identifier matching the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Escalate => "ESCALATE",
            Decision::Reject => "REJECT",
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provenance of the decision that ended up in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictSource {
    /// Policy gate short-circuit; the LLM was never consulted.
    #[serde(rename = "POLICY")]
    Policy,
    /// LLM verdict that agreed with the decision matrix.
    #[serde(rename = "LLM")]
    Llm,
    /// Matrix-mandated decision substituted for an unavailable,
    /// unparseable, or matrix-violating LLM response.
    #[serde(rename = "LLM_FALLBACK")]
    LlmFallback,
}

/// A mandatory short-circuit produced by the policy gate.
///
/// Policy verdicts are final: confidence is 1.0 and the synthesizer is not
/// invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyVerdict {
    pub decision: Decision,
    /// Ordered reasons, most specific first.
    pub reasoning: Vec<String>,
}

/// The synthesizer's verdict, matrix-enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmVerdict {
    pub decision: Decision,
    /// Model confidence in [0, 1].
    pub confidence: f64,
    pub summary: String,
    /// Preserved verbatim from the model response when one parsed.
    pub reasoning: Vec<String>,
    /// Preserved verbatim from the model response when one parsed.
    pub key_indicators: Vec<String>,
    pub actions: Vec<String>,
    /// `Llm` when the model's recommendation stood, `LlmFallback` when the
    /// matrix value was substituted.
    pub source: VerdictSource,
}

/// History counters as they stood before this request committed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomerContext {
    pub fraud_count_before: u32,
    pub escalate_count_before: u32,
    pub class: CustomerClass,
}

/// The emitted artifact: ML context plus the chosen verdict.
///
/// Created fresh per request; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decision_id: Uuid,
    pub decided_at: DateTime<Utc>,
    pub ml_analysis: MlAnalysis,
    pub decision: Decision,
    pub confidence_score: f64,
    pub source: VerdictSource,
    pub summary: String,
    pub reasoning: Vec<String>,
    pub key_indicators: Vec<String>,
    pub actionable_recommendations: Vec<String>,
    pub customer_context: CustomerContext,
}
