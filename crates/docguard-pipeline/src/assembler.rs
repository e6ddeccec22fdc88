//! The decision assembler.
//!
//! Picks the gate verdict when one fired, otherwise the synthesizer's, and
//! re-enforces the decision matrix before the record is emitted. Gate
//! verdicts are final by construction; a synthesizer verdict that disagrees
//! with the matrix is forced to the matrix value and tagged
//! `LLM_FALLBACK`, with the model's reasoning preserved.

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use docguard_core::{
    CustomerContext, DecisionMatrix, DecisionRecord, LlmVerdict, MlAnalysis, PolicyVerdict,
    VerdictSource,
};

/// The verdict the assembler chose between.
#[derive(Debug, Clone)]
pub enum ChosenVerdict {
    Policy(PolicyVerdict),
    Llm(LlmVerdict),
}

/// Assemble the emitted record from the chosen verdict and ML context.
pub fn assemble_record(
    verdict: ChosenVerdict,
    analysis: MlAnalysis,
    context: CustomerContext,
    matrix: &DecisionMatrix,
) -> DecisionRecord {
    match verdict {
        ChosenVerdict::Policy(policy) => DecisionRecord {
            decision_id: Uuid::new_v4(),
            decided_at: Utc::now(),
            decision: policy.decision,
            confidence_score: 1.0,
            source: VerdictSource::Policy,
            summary: policy
                .reasoning
                .first()
                .cloned()
                .unwrap_or_else(|| policy.decision.to_string()),
            reasoning: policy.reasoning,
            key_indicators: analysis.anomalies.clone(),
            actionable_recommendations: Vec::new(),
            customer_context: context,
            ml_analysis: analysis,
        },
        ChosenVerdict::Llm(mut llm) => {
            let required = matrix.required_decision(context.class, analysis.score);
            if llm.decision != required {
                warn!(
                    verdict = %llm.decision,
                    %required,
                    class = %context.class,
                    score = analysis.score,
                    "assembler overriding matrix-violating verdict"
                );
                llm.decision = required;
                llm.source = VerdictSource::LlmFallback;
            }
            DecisionRecord {
                decision_id: Uuid::new_v4(),
                decided_at: Utc::now(),
                decision: llm.decision,
                confidence_score: llm.confidence,
                source: llm.source,
                summary: llm.summary,
                reasoning: llm.reasoning,
                key_indicators: llm.key_indicators,
                actionable_recommendations: llm.actions,
                customer_context: context,
                ml_analysis: analysis,
            }
        }
    }
}
