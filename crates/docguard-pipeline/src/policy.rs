//! The policy gate.
//!
//! A pre-LLM short-circuit. Rules evaluate in declared order and the first
//! match wins; a gate verdict is final and the synthesizer is not invoked.

use docguard_core::{
    CustomerRecord, Decision, DocumentKind, FeatureVector, NormalizedDocument, PolicyVerdict,
};

/// Reason strings are part of the audit record; keep them stable.
const REASON_UNVERIFIABLE_IDENTITY: &str =
    "first-time / unverifiable identity - manual review required";
const REASON_DUPLICATE: &str = "duplicate submission";
const REASON_REPEAT_OFFENDER: &str = "repeat offender";
const REASON_UNSUPPORTED_ISSUER: &str = "unsupported issuer";
const REASON_MISSING_CHECK_IDENTITY: &str =
    "missing required identity fields (check number / payer / payee)";
const REASON_INVALID_ROUTING: &str = "invalid routing number";
const REASON_FUTURE_DATED: &str = "future-dated instrument";

/// Inputs the gate needs beyond the document itself.
#[derive(Debug, Clone, Copy)]
pub struct GateContext<'a> {
    /// The normalized identity key, when the document carries one.
    pub identity: Option<&'a str>,
    /// The existing customer record, when one is on file.
    pub record: Option<&'a CustomerRecord>,
    /// Whether the submission fingerprint is already on file.
    pub duplicate: bool,
}

/// Evaluate the gate rules in order; `None` means no short-circuit and the
/// synthesizer runs.
pub fn evaluate_gate(
    doc: &NormalizedDocument,
    features: &FeatureVector,
    context: GateContext<'_>,
) -> Option<PolicyVerdict> {
    // Rule 1: no identity key means no history, no duplicate detection,
    // and no basis for automated approval.
    if context.identity.is_none() {
        return Some(verdict(Decision::Escalate, REASON_UNVERIFIABLE_IDENTITY));
    }

    // Rule 2: exact resubmission.
    if context.duplicate {
        return Some(verdict(Decision::Reject, REASON_DUPLICATE));
    }

    // Rule 3: prior escalations reject outright.
    if context.record.map(|r| r.escalate_count > 0).unwrap_or(false) {
        return Some(verdict(Decision::Reject, REASON_REPEAT_OFFENDER));
    }

    // Rule 4: per-kind mandatory rejects, independent of the ML score.
    mandatory_reject(doc, features).map(|reason| verdict(Decision::Reject, reason))
}

fn mandatory_reject(doc: &NormalizedDocument, features: &FeatureVector) -> Option<&'static str> {
    if issuer_named_but_unsupported(features) {
        return Some(REASON_UNSUPPORTED_ISSUER);
    }

    if doc.kind() == DocumentKind::Check {
        if !flag(features, "has_check_number")
            || !flag(features, "has_payer_name")
            || !flag(features, "has_payee_name")
        {
            return Some(REASON_MISSING_CHECK_IDENTITY);
        }
        if flag(features, "has_routing_number")
            && (!flag(features, "routing_format_valid")
                || !flag(features, "routing_checksum_valid"))
        {
            return Some(REASON_INVALID_ROUTING);
        }
    }

    if flag(features, "future_dated") || flag(features, "future_period") {
        return Some(REASON_FUTURE_DATED);
    }

    None
}

fn issuer_named_but_unsupported(features: &FeatureVector) -> bool {
    let named = flag(features, "has_bank_name") || flag(features, "has_issuer_name");
    named
        && features
            .get("supported_issuer")
            .map(|v| v == 0.0)
            .unwrap_or(false)
}

fn flag(features: &FeatureVector, name: &str) -> bool {
    features.get(name).map(|v| v >= 0.5).unwrap_or(false)
}

fn verdict(decision: Decision, reason: &str) -> PolicyVerdict {
    PolicyVerdict {
        decision,
        reasoning: vec![reason.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use docguard_core::Check;
    use docguard_features::schema::schema_for;

    fn check_doc() -> NormalizedDocument {
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

    fn check_vector(overrides: &[(&str, f64)]) -> FeatureVector {
        let schema = schema_for(DocumentKind::Check);
        let mut values: Vec<f64> = schema.specs().iter().map(|s| s.default).collect();
        for (name, value) in overrides {
            values[schema.index_of(name).unwrap()] = *value;
        }
        FeatureVector::new(schema, values).unwrap()
    }

    fn valid_check_vector() -> FeatureVector {
        check_vector(&[
            ("has_bank_name", 1.0),
            ("has_routing_number", 1.0),
            ("has_check_number", 1.0),
            ("has_payer_name", 1.0),
            ("has_payee_name", 1.0),
            ("supported_issuer", 1.0),
            ("routing_format_valid", 1.0),
            ("routing_checksum_valid", 1.0),
            ("signature_detected", 1.0),
        ])
    }

    #[test]
    fn test_missing_identity_escalates_first() {
        // Identity wins over everything else, including duplicates.
        let verdict = evaluate_gate(
            &check_doc(),
            &valid_check_vector(),
            GateContext {
                identity: None,
                record: None,
                duplicate: true,
            },
        )
        .unwrap();
        assert_eq!(verdict.decision, Decision::Escalate);
        assert!(verdict.reasoning[0].contains("unverifiable identity"));
    }

    #[test]
    fn test_duplicate_rejects_before_repeat_offender() {
        let mut record = CustomerRecord::new("alice corp", Utc::now());
        record.escalate_count = 1;
        let verdict = evaluate_gate(
            &check_doc(),
            &valid_check_vector(),
            GateContext {
                identity: Some("alice corp"),
                record: Some(&record),
                duplicate: true,
            },
        )
        .unwrap();
        assert_eq!(verdict.decision, Decision::Reject);
        assert_eq!(verdict.reasoning, vec!["duplicate submission".to_string()]);
    }

    #[test]
    fn test_repeat_offender_rejects() {
        let mut record = CustomerRecord::new("alice corp", Utc::now());
        record.escalate_count = 2;
        let verdict = evaluate_gate(
            &check_doc(),
            &valid_check_vector(),
            GateContext {
                identity: Some("alice corp"),
                record: Some(&record),
                duplicate: false,
            },
        )
        .unwrap();
        assert_eq!(verdict.decision, Decision::Reject);
        assert_eq!(verdict.reasoning, vec!["repeat offender".to_string()]);
    }

    #[test]
    fn test_future_dated_check_rejects() {
        let mut overrides = vec![("future_dated", 1.0)];
        overrides.extend_from_slice(&[
            ("has_bank_name", 1.0),
            ("has_check_number", 1.0),
            ("has_payer_name", 1.0),
            ("has_payee_name", 1.0),
            ("supported_issuer", 1.0),
        ]);
        let verdict = evaluate_gate(
            &check_doc(),
            &check_vector(&overrides),
            GateContext {
                identity: Some("alice corp"),
                record: None,
                duplicate: false,
            },
        )
        .unwrap();
        assert_eq!(verdict.decision, Decision::Reject);
        assert_eq!(verdict.reasoning, vec!["future-dated instrument".to_string()]);
    }

    #[test]
    fn test_invalid_routing_rejects() {
        let verdict = evaluate_gate(
            &check_doc(),
            &check_vector(&[
                ("has_bank_name", 1.0),
                ("supported_issuer", 1.0),
                ("has_routing_number", 1.0),
                ("routing_format_valid", 1.0),
                ("routing_checksum_valid", 0.0),
                ("has_check_number", 1.0),
                ("has_payer_name", 1.0),
                ("has_payee_name", 1.0),
            ]),
            GateContext {
                identity: Some("alice corp"),
                record: None,
                duplicate: false,
            },
        )
        .unwrap();
        assert_eq!(verdict.decision, Decision::Reject);
        assert_eq!(verdict.reasoning, vec!["invalid routing number".to_string()]);
    }

    #[test]
    fn test_clean_request_is_not_gated() {
        let record = CustomerRecord::new("alice corp", Utc::now());
        let gated = evaluate_gate(
            &check_doc(),
            &valid_check_vector(),
            GateContext {
                identity: Some("alice corp"),
                record: Some(&record),
                duplicate: false,
            },
        );
        assert!(gated.is_none());
    }
}
