//! The decision synthesizer.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use docguard_core::{
    CustomerSummary, Decision, DecisionMatrix, LlmVerdict, MlAnalysis, NormalizedDocument,
    VerdictSource,
};

use crate::client::LlmClient;
use crate::error::LlmError;
use crate::parse::parse_reply;
use crate::prompt::{system_prompt, user_prompt};

/// Synthetic reason attached when the model never produced a usable reply.
const UNAVAILABLE_REASON: &str = "LLM unavailable; decision derived from matrix";

/// Produces matrix-constrained verdicts from LLM completions.
///
/// Owns the client handle. Synthesis is infallible by design: transport
/// failures, deadline expiry, parse failures, and matrix violations all
/// resolve to an `LLM_FALLBACK` verdict locally.
pub struct DecisionSynthesizer {
    client: Arc<dyn LlmClient>,
    matrix: DecisionMatrix,
    deadline: Duration,
}

impl DecisionSynthesizer {
    /// Build a synthesizer with a hard per-call deadline.
    pub fn new(client: Arc<dyn LlmClient>, matrix: DecisionMatrix, deadline: Duration) -> Self {
        Self {
            client,
            matrix,
            deadline,
        }
    }

    /// Synthesize a verdict for a non-gated request.
    pub async fn synthesize(
        &self,
        doc: &NormalizedDocument,
        analysis: &MlAnalysis,
        customer: &CustomerSummary,
    ) -> LlmVerdict {
        let required = self.matrix.required_decision(customer.class, analysis.score);

        let system = system_prompt(&self.matrix);
        let user = user_prompt(doc, analysis, customer);

        let completion = tokio::time::timeout(
            self.deadline,
            self.client.complete(&system, &user),
        )
        .await
        .unwrap_or(Err(LlmError::DeadlineExceeded {
            seconds: self.deadline.as_secs(),
        }));

        let text = match completion {
            Ok(text) => text,
            Err(error) => {
                warn!(%error, "LLM call failed; falling back to matrix decision");
                return self.fallback_verdict(required);
            }
        };

        let reply = match parse_reply(&text) {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, "LLM reply unparseable; falling back to matrix decision");
                return self.fallback_verdict(required);
            }
        };

        // Reasoning and key indicators are preserved verbatim even when the
        // recommendation itself is overridden.
        match reply.decision() {
            Some(decision) if decision == required => LlmVerdict {
                decision,
                confidence: reply.clamped_confidence(),
                summary: reply.summary,
                reasoning: reply.reasoning,
                key_indicators: reply.key_indicators,
                actions: reply.actionable_recommendations,
                source: VerdictSource::Llm,
            },
            other => {
                warn!(
                    recommended = ?other,
                    required = %required,
                    "LLM recommendation violates the decision matrix; overriding"
                );
                LlmVerdict {
                    decision: required,
                    confidence: reply.clamped_confidence(),
                    summary: reply.summary,
                    reasoning: reply.reasoning,
                    key_indicators: reply.key_indicators,
                    actions: reply.actionable_recommendations,
                    source: VerdictSource::LlmFallback,
                }
            }
        }
    }

    fn fallback_verdict(&self, required: Decision) -> LlmVerdict {
        LlmVerdict {
            decision: required,
            // The matrix is deterministic; the fallback carries full
            // confidence in the mandated decision.
            confidence: 1.0,
            summary: UNAVAILABLE_REASON.to_string(),
            reasoning: vec![UNAVAILABLE_REASON.to_string()],
            key_indicators: Vec::new(),
            actions: Vec::new(),
            source: VerdictSource::LlmFallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ScriptedClient;
    use docguard_core::{
        Check, CustomerClass, MlAnalysis, ModelScores, RiskLevel,
    };

    fn doc() -> NormalizedDocument {
        NormalizedDocument::Check(Check {
            bank_name: Some("Chase".into()),
            routing_number: Some("021000021".into()),
            account_number: Some("123456789012".into()),
            check_number: Some("1042".into()),
            amount_numeric: None,
            amount_written: None,
            payer_name: Some("Alice Corp".into()),
            payer_address: None,
            payee_name: Some("Bob Supplies".into()),
            check_date: None,
            signature_detected: Some(true),
            memo: None,
        })
    }

    fn analysis(score: f64) -> MlAnalysis {
        MlAnalysis {
            score,
            risk_level: RiskLevel::from_score(score),
            confidence: 0.9,
            model_scores: ModelScores {
                random_forest: score,
                xgboost: score,
                ensemble: score,
                adjusted: score,
            },
            feature_importance: vec![],
            anomalies: vec![],
        }
    }

    fn new_customer() -> CustomerSummary {
        CustomerSummary {
            class: CustomerClass::New,
            fraud_count: 0,
            escalate_count: 0,
            last_decision: None,
        }
    }

    fn synthesizer(client: ScriptedClient) -> DecisionSynthesizer {
        DecisionSynthesizer::new(
            Arc::new(client),
            DecisionMatrix::default(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_agreeing_reply_passes_through() {
        let client = ScriptedClient::with_responses(vec![Ok(r#"{
            "recommendation": "ESCALATE",
            "confidence_score": 0.7,
            "summary": "Risk band requires escalation.",
            "reasoning": ["score 0.45 is above the approve threshold"],
            "key_indicators": ["medium risk"],
            "actionable_recommendations": ["route to manual review"]
        }"#
        .to_string())]);
        let verdict = synthesizer(client)
            .synthesize(&doc(), &analysis(0.45), &new_customer())
            .await;
        assert_eq!(verdict.decision, Decision::Escalate);
        assert_eq!(verdict.source, VerdictSource::Llm);
        assert_eq!(verdict.confidence, 0.7);
    }

    #[tokio::test]
    async fn test_matrix_violation_is_overridden_preserving_reasoning() {
        let client = ScriptedClient::with_responses(vec![Ok(r#"{
            "recommendation": "APPROVE",
            "confidence_score": 0.95,
            "summary": "Looks fine to me.",
            "reasoning": ["the balance matched", "the issuer is known"],
            "key_indicators": ["clean history"],
            "actionable_recommendations": []
        }"#
        .to_string())]);
        let verdict = synthesizer(client)
            .synthesize(&doc(), &analysis(0.45), &new_customer())
            .await;
        // NEW at 0.45 must escalate, whatever the model said.
        assert_eq!(verdict.decision, Decision::Escalate);
        assert_eq!(verdict.source, VerdictSource::LlmFallback);
        assert_eq!(
            verdict.reasoning,
            vec!["the balance matched".to_string(), "the issuer is known".to_string()]
        );
        assert_eq!(verdict.key_indicators, vec!["clean history".to_string()]);
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back() {
        let client =
            ScriptedClient::with_responses(vec![Ok("I'd rather not say.".to_string())]);
        let verdict = synthesizer(client)
            .synthesize(&doc(), &analysis(0.1), &new_customer())
            .await;
        assert_eq!(verdict.decision, Decision::Approve);
        assert_eq!(verdict.source, VerdictSource::LlmFallback);
        assert!(verdict.summary.contains("LLM unavailable"));
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back() {
        let verdict = synthesizer(ScriptedClient::unreachable())
            .synthesize(&doc(), &analysis(0.95), &new_customer())
            .await;
        // NEW never auto-rejects; the matrix escalates even at 0.95.
        assert_eq!(verdict.decision, Decision::Escalate);
        assert_eq!(verdict.source, VerdictSource::LlmFallback);
        assert_eq!(verdict.confidence, 1.0);
    }
}
