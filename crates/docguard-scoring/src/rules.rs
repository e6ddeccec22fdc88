//! Hard validation rules and the anomaly walk.
//!
//! The rules monotonically raise the ensemble score for specific
//! violations; they never lower it. Anomalies are reported in canonical
//! order: hard rules in their declared order first, then per-feature
//! findings in feature-index order. The walk is deterministic, so the
//! anomaly list is stable across runs for the same vector.

use docguard_core::{DocumentKind, FeatureVector};

/// Outcome of the rule pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    /// Score after all rules, clamped to [0, 1].
    pub adjusted: f64,
    /// Canonical-order anomaly descriptions.
    pub anomalies: Vec<String>,
}

/// Apply the hard validation rules to an ensemble score.
pub fn apply_hard_rules(ensemble: f64, features: &FeatureVector) -> RuleOutcome {
    let mut score = ensemble;
    let mut anomalies = Vec::new();

    // Rule 1: issuer named but not a supported institution.
    if issuer_named_but_unsupported(features) {
        score = score.max(0.50);
        anomalies.push("Unsupported issuer".to_string());
    }

    // Rule 2: future-dated period or instrument.
    if flag_set(features, "future_dated") || flag_set(features, "future_period") {
        score += 0.40;
        anomalies.push("Future date detected".to_string());
    }

    // Rule 3: negative ending balance.
    if flag_set(features, "negative_ending_balance") {
        score += 0.35;
        anomalies.push("Negative ending balance".to_string());
    }

    // Rule 4: balance reconciliation failed outright.
    if features
        .get("balance_consistency")
        .map(|v| v < 0.5)
        .unwrap_or(false)
    {
        score += 0.40;
        anomalies.push("Balance reconciliation failed".to_string());
    }

    // Rule 5: too many critical fields absent.
    if features
        .get("critical_missing_count")
        .map(|v| v >= 4.0)
        .unwrap_or(false)
    {
        score += 0.30;
        anomalies.push("Multiple critical fields missing".to_string());
    }

    // Rule 6: checks must carry a signature.
    if features.kind() == DocumentKind::Check && !flag_set(features, "signature_detected") {
        score += 0.35;
        anomalies.push("Missing signature".to_string());
    }

    let adjusted = score.clamp(0.0, 1.0);
    anomalies.extend(feature_findings(features));

    RuleOutcome {
        adjusted,
        anomalies,
    }
}

/// Per-feature finding predicates, keyed by the feature whose schema index
/// orders the finding. Conditions may read the whole vector.
type FindingPredicate = fn(&FeatureVector) -> bool;

const FINDINGS: &[(&str, FindingPredicate, &str)] = &[
    (
        "account_number_valid",
        |f| flag_set(f, "has_account_number") && !flag_set(f, "account_number_valid"),
        "Account number format invalid",
    ),
    (
        "routing_checksum_valid",
        |f| flag_set(f, "has_routing_number") && !flag_set(f, "routing_checksum_valid"),
        "Routing number fails checksum",
    ),
    (
        "stale_dated",
        |f| flag_set(f, "stale_dated"),
        "Stale-dated instrument",
    ),
    (
        "round_amount_ratio",
        |f| f.get("round_amount_ratio").map(|v| v > 0.5).unwrap_or(false),
        "High round-number transaction ratio",
    ),
    (
        "weekend_ratio",
        |f| f.get("weekend_ratio").map(|v| v > 0.6).unwrap_or(false),
        "Unusual weekend activity concentration",
    ),
    (
        "duplicate_transaction_count",
        |f| f.get("duplicate_transaction_count").map(|v| v > 0.0).unwrap_or(false),
        "Duplicate transactions detected",
    ),
    (
        "out_of_period_count",
        |f| f.get("out_of_period_count").map(|v| v > 0.0).unwrap_or(false),
        "Transactions dated outside statement period",
    ),
    (
        "written_amount_consistency",
        |f| {
            flag_set(f, "has_amount_written")
                && f.get("written_amount_consistency") == Some(0.0)
        },
        "Written amount does not match numeric amount",
    ),
    (
        "net_not_exceeding_gross",
        |f| flag_set(f, "has_gross_pay") && flag_set(f, "has_net_pay")
            && !flag_set(f, "net_not_exceeding_gross"),
        "Net pay exceeds gross pay",
    ),
    (
        "social_security_rate_consistent",
        |f| flag_set(f, "has_gross_pay") && f.get("social_security_rate_consistent") == Some(0.0),
        "Social Security withholding off statutory rate",
    ),
    (
        "medicare_rate_consistent",
        |f| flag_set(f, "has_gross_pay") && f.get("medicare_rate_consistent") == Some(0.0),
        "Medicare withholding off statutory rate",
    ),
    (
        "over_limit",
        |f| flag_set(f, "over_limit"),
        "Amount exceeds money order limit",
    ),
];

/// Walk the declared finding predicates in feature-index order.
fn feature_findings(features: &FeatureVector) -> Vec<String> {
    let schema = features.schema();
    let mut indexed: Vec<(usize, &str)> = FINDINGS
        .iter()
        .filter_map(|(anchor, predicate, message)| {
            let index = schema.index_of(anchor)?;
            predicate(features).then_some((index, *message))
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);
    indexed.into_iter().map(|(_, m)| m.to_string()).collect()
}

fn issuer_named_but_unsupported(features: &FeatureVector) -> bool {
    let named = flag_set(features, "has_bank_name") || flag_set(features, "has_issuer_name");
    named
        && features
            .get("supported_issuer")
            .map(|v| v == 0.0)
            .unwrap_or(false)
}

fn flag_set(features: &FeatureVector, name: &str) -> bool {
    features.get(name).map(|v| v >= 0.5).unwrap_or(false)
}
