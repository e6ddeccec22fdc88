//! End-to-end pipeline scenarios.
//!
//! These run the full pipeline with the mock scorer, a scripted LLM
//! client, and an in-memory history store, pinned to a fixed reference
//! date so future/stale predicates are deterministic.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use docguard_config::KindToggles;
use docguard_core::{
    BankStatement, Check, CustomerClass, CustomerRecord, Decision, DecisionMatrix, MonetaryAmount,
    NormalizedDocument, RiskLevel, Transaction, VerdictSource,
};
use docguard_history::{HistoryStore, InMemoryHistoryStore};
use docguard_llm::{DecisionSynthesizer, LlmResult, ScriptedClient};
use docguard_pipeline::{FraudPipeline, PipelineError};
use docguard_scoring::FraudScorer;

const AS_OF: &str = "2024-11-15";

fn as_of() -> NaiveDate {
    AS_OF.parse().unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn txn(d: NaiveDate, desc: &str, amount: rust_decimal::Decimal) -> Transaction {
    Transaction {
        date: Some(d),
        description: Some(desc.to_string()),
        amount: Some(MonetaryAmount::usd(amount)),
    }
}

/// The S1 statement: Chase, John Smith, reconciled balances, October 2024.
fn clean_statement() -> NormalizedDocument {
    NormalizedDocument::BankStatement(BankStatement {
        bank_name: Some("Chase".into()),
        bank_address: Some("270 Park Ave".into()),
        account_holder_name: Some("John Smith".into()),
        account_holder_names: vec![],
        account_number: Some("4532887123456789".into()),
        account_type: Some("checking".into()),
        currency: Some("USD".into()),
        statement_period_start_date: Some(date(2024, 10, 1)),
        statement_period_end_date: Some(date(2024, 10, 31)),
        statement_date: Some(date(2024, 11, 1)),
        beginning_balance: Some(MonetaryAmount::usd(dec!(5000.00))),
        ending_balance: Some(MonetaryAmount::usd(dec!(6200.00))),
        total_credits: Some(MonetaryAmount::usd(dec!(8500.00))),
        total_debits: Some(MonetaryAmount::usd(dec!(7300.00))),
        transactions: vec![
            txn(date(2024, 10, 2), "payroll deposit", dec!(4250.00)),
            txn(date(2024, 10, 9), "rent", dec!(-2150.00)),
            txn(date(2024, 10, 16), "payroll deposit", dec!(4250.00)),
            txn(date(2024, 10, 21), "groceries", dec!(-315.45)),
            txn(date(2024, 10, 28), "utilities", dec!(-184.55)),
        ],
    })
}

fn valid_check(payer: &str) -> Check {
    Check {
        bank_name: Some("Chase".into()),
        routing_number: Some("021000021".into()),
        account_number: Some("123456789012".into()),
        check_number: Some("1042".into()),
        amount_numeric: Some(MonetaryAmount::usd(dec!(850.00))),
        amount_written: Some("Eight hundred fifty and 00/100".into()),
        payer_name: Some(payer.into()),
        payer_address: Some("500 Market St, San Francisco".into()),
        payee_name: Some("Bob Supplies".into()),
        check_date: Some(date(2024, 11, 1)),
        signature_detected: Some(true),
        memo: None,
    }
}

fn llm_reply(recommendation: &str) -> LlmResult<String> {
    Ok(format!(
        r#"{{
            "recommendation": "{recommendation}",
            "confidence_score": 0.85,
            "summary": "Assessment per the decision matrix.",
            "reasoning": ["matrix lookup"],
            "key_indicators": ["score band"],
            "actionable_recommendations": ["archive the decision"]
        }}"#
    ))
}

fn pipeline_with(
    responses: Vec<LlmResult<String>>,
    history: Arc<dyn HistoryStore>,
) -> FraudPipeline {
    let matrix = DecisionMatrix::default();
    let synthesizer = DecisionSynthesizer::new(
        Arc::new(ScriptedClient::with_responses(responses)),
        matrix,
        Duration::from_secs(5),
    );
    FraudPipeline::new(
        FraudScorer::mock(),
        synthesizer,
        history,
        matrix,
        KindToggles::default(),
    )
    .with_reference_date(as_of())
}

fn raw_text() -> String {
    "CHASE BANK STATEMENT ".repeat(40)
}

#[tokio::test]
async fn s1_clean_statement_clean_customer_approves() {
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let pipeline = pipeline_with(vec![llm_reply("APPROVE")], history.clone());

    let record = pipeline.process(&clean_statement(), &raw_text()).await.unwrap();

    assert_eq!(record.decision, Decision::Approve);
    assert_eq!(record.source, VerdictSource::Llm);
    assert_eq!(record.ml_analysis.risk_level, RiskLevel::Low);
    assert!(record.ml_analysis.score < 0.30);
    assert_eq!(record.customer_context.class, CustomerClass::New);

    // The assembler's emitted decision equals the matrix value.
    let required = DecisionMatrix::default()
        .required_decision(record.customer_context.class, record.ml_analysis.score);
    assert_eq!(record.decision, required);

    let stored = history.lookup("john smith").await.unwrap().unwrap();
    assert_eq!(stored.last_decision, Some(Decision::Approve));
    assert_eq!(stored.fraud_count, 0);
}

#[tokio::test]
async fn s2_balance_inconsistency_escalates_new_customer() {
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let pipeline = pipeline_with(vec![llm_reply("ESCALATE")], history);

    let mut doc = clean_statement();
    if let NormalizedDocument::BankStatement(s) = &mut doc {
        s.ending_balance = Some(MonetaryAmount::usd(dec!(8266.86)));
    }

    let record = pipeline.process(&doc, &raw_text()).await.unwrap();

    assert_eq!(record.decision, Decision::Escalate);
    assert_eq!(record.ml_analysis.risk_level, RiskLevel::High);
    assert!(record.ml_analysis.score >= 0.30);
    assert!(record
        .ml_analysis
        .anomalies
        .contains(&"Balance reconciliation failed".to_string()));
    // The hard rule raised the ensemble score.
    assert!(record.ml_analysis.model_scores.adjusted > record.ml_analysis.model_scores.ensemble);
}

#[tokio::test]
async fn s3_missing_identity_escalates_via_policy() {
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    // No scripted responses: a synthesizer invocation would surface as
    // LLM_FALLBACK, so POLICY proves the short-circuit.
    let pipeline = pipeline_with(vec![], history.clone());

    let mut doc = clean_statement();
    if let NormalizedDocument::BankStatement(s) = &mut doc {
        s.account_holder_name = None;
    }

    let record = pipeline.process(&doc, &raw_text()).await.unwrap();

    assert_eq!(record.decision, Decision::Escalate);
    assert_eq!(record.source, VerdictSource::Policy);
    assert_eq!(record.confidence_score, 1.0);
    assert!(record.reasoning[0].contains("unverifiable identity"));
    // The ML analysis is still computed and attached.
    assert!(record.ml_analysis.score >= 0.0);

    // No identity key, so nothing was committed.
    assert!(history.lookup("john smith").await.unwrap().is_none());
}

#[tokio::test]
async fn s4_repeat_offender_rejected_and_counted() {
    let store = Arc::new(InMemoryHistoryStore::new());
    let mut seeded = CustomerRecord::new("alice corp", chrono::Utc::now());
    seeded.escalate_count = 1;
    seeded.last_decision = Some(Decision::Escalate);
    store.insert_record(seeded).unwrap();

    let history: Arc<dyn HistoryStore> = store.clone();
    let pipeline = pipeline_with(vec![], history.clone());

    let doc = NormalizedDocument::Check(valid_check("Alice Corp"));
    let record = pipeline.process(&doc, &raw_text()).await.unwrap();

    assert_eq!(record.decision, Decision::Reject);
    assert_eq!(record.source, VerdictSource::Policy);
    assert_eq!(record.reasoning, vec!["repeat offender".to_string()]);
    assert_eq!(record.customer_context.class, CustomerClass::Repeat);
    assert_eq!(record.customer_context.escalate_count_before, 1);

    let stored = history.lookup("alice corp").await.unwrap().unwrap();
    assert_eq!(stored.fraud_count, 1);
    assert_eq!(stored.escalate_count, 1);
}

#[tokio::test]
async fn s5_future_dated_check_rejected_before_synthesis() {
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let pipeline = pipeline_with(vec![], history);

    let mut check = valid_check("Alice Corp");
    check.check_date = Some(date(2024, 11, 22));
    let record = pipeline
        .process(&NormalizedDocument::Check(check), &raw_text())
        .await
        .unwrap();

    assert_eq!(record.decision, Decision::Reject);
    assert_eq!(record.source, VerdictSource::Policy);
    assert_eq!(record.reasoning, vec!["future-dated instrument".to_string()]);
    assert!(record
        .ml_analysis
        .anomalies
        .contains(&"Future date detected".to_string()));
}

#[tokio::test]
async fn s6_duplicate_statement_rejected_without_synthesis() {
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let pipeline = pipeline_with(vec![llm_reply("APPROVE")], history.clone());

    let first = pipeline.process(&clean_statement(), &raw_text()).await.unwrap();
    assert_eq!(first.decision, Decision::Approve);

    let second = pipeline.process(&clean_statement(), &raw_text()).await.unwrap();
    assert_eq!(second.decision, Decision::Reject);
    assert_eq!(second.source, VerdictSource::Policy);
    assert_eq!(second.reasoning, vec!["duplicate submission".to_string()]);

    let stored = history.lookup("john smith").await.unwrap().unwrap();
    // One REJECT increment, and the fingerprint set is unchanged.
    assert_eq!(stored.fraud_count, 1);
    assert_eq!(stored.fingerprints.len(), 1);
}

#[tokio::test]
async fn disabled_kind_fails_fast() {
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let matrix = DecisionMatrix::default();
    let synthesizer = DecisionSynthesizer::new(
        Arc::new(ScriptedClient::unreachable()),
        matrix,
        Duration::from_secs(1),
    );
    let pipeline = FraudPipeline::new(
        FraudScorer::mock(),
        synthesizer,
        history,
        matrix,
        KindToggles {
            bank_statement: false,
            ..KindToggles::default()
        },
    )
    .with_reference_date(as_of());

    let err = pipeline
        .process(&clean_statement(), &raw_text())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::KindDisabled { .. }));
}

#[tokio::test]
async fn unreachable_llm_still_decides_from_matrix() {
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let pipeline = pipeline_with(vec![], history);

    let record = pipeline.process(&clean_statement(), &raw_text()).await.unwrap();

    assert_eq!(record.decision, Decision::Approve);
    assert_eq!(record.source, VerdictSource::LlmFallback);
    assert!(record.summary.contains("LLM unavailable"));
}

#[tokio::test]
async fn decision_record_serializes_to_wire_shape() {
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());
    let pipeline = pipeline_with(vec![llm_reply("APPROVE")], history);

    let record = pipeline.process(&clean_statement(), &raw_text()).await.unwrap();
    let json = serde_json::to_value(&record).unwrap();

    assert!(json["ml_analysis"]["fraud_risk_score"].is_number());
    assert_eq!(json["ml_analysis"]["risk_level"], "LOW");
    assert!(json["ml_analysis"]["model_scores"]["random_forest"].is_number());
    assert!(json["ml_analysis"]["model_scores"]["xgboost"].is_number());
    assert_eq!(json["decision"], "APPROVE");
    assert_eq!(json["source"], "LLM");
    assert!(json["customer_context"]["fraud_count_before"].is_number());
    assert_eq!(json["customer_context"]["class"], "NEW");
    assert!(json["reasoning"].is_array());
    assert!(json["actionable_recommendations"].is_array());
}

#[tokio::test]
async fn file_backed_history_carries_duplicates_across_restarts() {
    use docguard_history::JsonFileHistoryStore;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    {
        let history: Arc<dyn HistoryStore> =
            Arc::new(JsonFileHistoryStore::open(&path).unwrap());
        let pipeline = pipeline_with(vec![llm_reply("APPROVE")], history);
        let record = pipeline.process(&clean_statement(), &raw_text()).await.unwrap();
        assert_eq!(record.decision, Decision::Approve);
    }

    // A new process sees the committed fingerprint and rejects the replay.
    let history: Arc<dyn HistoryStore> = Arc::new(JsonFileHistoryStore::open(&path).unwrap());
    let pipeline = pipeline_with(vec![llm_reply("APPROVE")], history);
    let record = pipeline.process(&clean_statement(), &raw_text()).await.unwrap();
    assert_eq!(record.decision, Decision::Reject);
    assert_eq!(record.reasoning, vec!["duplicate submission".to_string()]);
}

#[tokio::test]
async fn repeated_rejects_keep_counters_monotone() {
    let history: Arc<dyn HistoryStore> = Arc::new(InMemoryHistoryStore::new());

    let mut previous_fraud = 0;
    for attempt in 0..3 {
        let pipeline = pipeline_with(vec![], history.clone());
        let mut check = valid_check("Mallory LLC");
        check.check_number = Some(format!("20{attempt}"));
        check.check_date = Some(date(2024, 11, 22));
        let record = pipeline
            .process(&NormalizedDocument::Check(check), &raw_text())
            .await
            .unwrap();
        assert_eq!(record.decision, Decision::Reject);

        let stored = history.lookup("mallory llc").await.unwrap().unwrap();
        assert!(stored.fraud_count > previous_fraud);
        previous_fraud = stored.fraud_count;
    }
}
