//! The end-to-end fraud pipeline.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

use docguard_config::KindToggles;
use docguard_core::{
    CustomerClass, CustomerContext, CustomerSummary, DecisionMatrix, DecisionRecord,
    NormalizedDocument, SubmissionFingerprint,
};
use docguard_features::FeatureExtractor;
use docguard_history::HistoryStore;
use docguard_llm::DecisionSynthesizer;
use docguard_scoring::FraudScorer;

use crate::assembler::{assemble_record, ChosenVerdict};
use crate::error::{PipelineError, PipelineResult};
use crate::policy::{evaluate_gate, GateContext};

/// The assembled pipeline. Model artifacts and the LLM client are shared
/// and read-only after construction; the only mutable shared state is the
/// history store.
pub struct FraudPipeline {
    scorer: FraudScorer,
    synthesizer: DecisionSynthesizer,
    history: Arc<dyn HistoryStore>,
    matrix: DecisionMatrix,
    kinds: KindToggles,
    /// Fixed reference date for extraction; `None` uses today's date.
    reference_date: Option<NaiveDate>,
}

impl FraudPipeline {
    pub fn new(
        scorer: FraudScorer,
        synthesizer: DecisionSynthesizer,
        history: Arc<dyn HistoryStore>,
        matrix: DecisionMatrix,
        kinds: KindToggles,
    ) -> Self {
        Self {
            scorer,
            synthesizer,
            history,
            matrix,
            kinds,
            reference_date: None,
        }
    }

    /// Pin the extraction reference date; used by tests to keep
    /// future/stale predicates deterministic.
    pub fn with_reference_date(mut self, as_of: NaiveDate) -> Self {
        self.reference_date = Some(as_of);
        self
    }

    /// The history store in use.
    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    /// Process one document end to end.
    pub async fn process(
        &self,
        doc: &NormalizedDocument,
        raw_text: &str,
    ) -> PipelineResult<DecisionRecord> {
        let kind = doc.kind();
        if !self.kinds.is_enabled(kind) {
            return Err(PipelineError::KindDisabled { kind });
        }

        let as_of = self.reference_date.unwrap_or_else(|| Utc::now().date_naive());
        let features = FeatureExtractor::new(as_of).extract(doc, raw_text)?;
        let analysis = self.scorer.score(&features)?;

        let identity = doc.identity_key();
        let fingerprint = SubmissionFingerprint::from_document(doc);

        // The guard covers duplicate check through commit so that two
        // concurrent submissions cannot both pass the duplicate gate.
        let _guard = match &identity {
            Some(identity) => Some(self.history.lock_identity(identity).await),
            None => None,
        };

        let record = match &identity {
            Some(identity) => match self.history.lookup(identity).await {
                Ok(record) => record,
                Err(error) => {
                    warn!(%error, %identity, "history lookup failed; treating customer as new");
                    None
                }
            },
            None => None,
        };

        let duplicate = match (&identity, &fingerprint) {
            (Some(identity), Some(fingerprint)) => {
                match self.history.has_fingerprint(identity, fingerprint).await {
                    Ok(duplicate) => duplicate,
                    Err(error) => {
                        warn!(%error, %identity, "fingerprint lookup failed; treating as first submission");
                        false
                    }
                }
            }
            _ => false,
        };

        let context = CustomerContext {
            fraud_count_before: record.as_ref().map(|r| r.fraud_count).unwrap_or(0),
            escalate_count_before: record.as_ref().map(|r| r.escalate_count).unwrap_or(0),
            class: CustomerClass::of(record.as_ref()),
        };

        let gate_verdict = evaluate_gate(
            doc,
            &features,
            GateContext {
                identity: identity.as_deref(),
                record: record.as_ref(),
                duplicate,
            },
        );

        let chosen = match gate_verdict {
            Some(policy) => ChosenVerdict::Policy(policy),
            None => {
                let summary = CustomerSummary::of(record.as_ref());
                let verdict = self.synthesizer.synthesize(doc, &analysis, &summary).await;
                ChosenVerdict::Llm(verdict)
            }
        };

        let decision_record = assemble_record(chosen, analysis, context, &self.matrix);

        // Commit exactly once, after the record is final. Without an
        // identity key there is nothing to key the record by.
        if let Some(identity) = &identity {
            self.history
                .commit(identity, decision_record.decision, fingerprint.as_ref())
                .await
                .map_err(PipelineError::HistoryCommit)?;
        }

        info!(
            %kind,
            decision = %decision_record.decision,
            source = ?decision_record.source,
            score = decision_record.ml_analysis.score,
            risk = %decision_record.ml_analysis.risk_level,
            class = %decision_record.customer_context.class,
            "decision finalized"
        );

        Ok(decision_record)
    }
}
