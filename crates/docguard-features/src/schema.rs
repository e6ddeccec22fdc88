//! Declared feature schemas, one per document kind.
//!
//! The schema is the source of truth for feature order: extractors emit in
//! this order, the scaler and regressors are trained against it, and the
//! anomaly walk reports per-feature findings in index order. Changing an
//! index is a breaking change to the model artifacts.

use docguard_core::{DocumentKind, FeatureSchema, FeatureSpec};

/// Cap on a single transaction or instrument amount feature.
pub const SINGLE_AMOUNT_CAP: f64 = 50_000.0;
/// Cap on statement-period totals and balances.
pub const PERIOD_TOTAL_CAP: f64 = 1_000_000.0;
/// Money orders are capped far lower than checks.
pub const MONEY_ORDER_AMOUNT_CAP: f64 = 1_000.0;
/// Transactions at or above this amount count as large.
pub const LARGE_TRANSACTION_THRESHOLD: f64 = 10_000.0;

/// Bank statement feature schema (35 features).
static BANK_STATEMENT_SPECS: [FeatureSpec; 35] = [
    FeatureSpec::flag("has_bank_name"),
    FeatureSpec::flag("has_account_holder_name"),
    FeatureSpec::flag("has_account_number"),
    FeatureSpec::flag("has_account_type"),
    FeatureSpec::flag("has_period_start"),
    FeatureSpec::flag("has_period_end"),
    FeatureSpec::flag("has_statement_date"),
    FeatureSpec::flag("has_beginning_balance"),
    FeatureSpec::flag("has_ending_balance"),
    FeatureSpec::flag("supported_issuer"),
    FeatureSpec::flag("account_number_valid"),
    FeatureSpec::flag("currency_supported"),
    FeatureSpec::flag("period_ordered"),
    FeatureSpec::flag("future_period"),
    FeatureSpec::bounded("period_length_days", 0.0, 120.0, 0.0),
    FeatureSpec::bounded("beginning_balance_magnitude", 0.0, PERIOD_TOTAL_CAP, 0.0),
    FeatureSpec::bounded("ending_balance_magnitude", 0.0, PERIOD_TOTAL_CAP, 0.0),
    FeatureSpec::flag("negative_ending_balance"),
    FeatureSpec::bounded("total_credits_magnitude", 0.0, PERIOD_TOTAL_CAP, 0.0),
    FeatureSpec::bounded("total_debits_magnitude", 0.0, PERIOD_TOTAL_CAP, 0.0),
    FeatureSpec::bounded("balance_consistency", 0.0, 1.0, 0.5),
    FeatureSpec::bounded("transaction_count", 0.0, 500.0, 0.0),
    FeatureSpec::bounded("avg_transaction_amount", 0.0, SINGLE_AMOUNT_CAP, 0.0),
    FeatureSpec::bounded("max_transaction_amount", 0.0, SINGLE_AMOUNT_CAP, 0.0),
    FeatureSpec::bounded("round_amount_count", 0.0, 100.0, 0.0),
    FeatureSpec::bounded("round_amount_ratio", 0.0, 1.0, 0.0),
    FeatureSpec::bounded("large_transaction_count", 0.0, 100.0, 0.0),
    FeatureSpec::bounded("weekend_ratio", 0.0, 1.0, 0.0),
    FeatureSpec::bounded("duplicate_transaction_count", 0.0, 100.0, 0.0),
    FeatureSpec::bounded("out_of_period_count", 0.0, 100.0, 0.0),
    FeatureSpec::bounded("balance_volatility", 0.0, 1.0, 0.0),
    FeatureSpec::bounded("credit_debit_ratio", 0.0, 10.0, 0.0),
    FeatureSpec::bounded("text_quality", 0.0, 1.0, 0.3),
    FeatureSpec::bounded("field_quality", 0.0, 1.0, 0.0),
    FeatureSpec::bounded("critical_missing_count", 0.0, 10.0, 0.0),
];

/// Check feature schema (30 features).
static CHECK_SPECS: [FeatureSpec; 30] = [
    FeatureSpec::flag("has_bank_name"),
    FeatureSpec::flag("has_routing_number"),
    FeatureSpec::flag("has_account_number"),
    FeatureSpec::flag("has_check_number"),
    FeatureSpec::flag("has_amount_numeric"),
    FeatureSpec::flag("has_amount_written"),
    FeatureSpec::flag("has_payer_name"),
    FeatureSpec::flag("has_payer_address"),
    FeatureSpec::flag("has_payee_name"),
    FeatureSpec::flag("has_check_date"),
    FeatureSpec::flag("has_memo"),
    FeatureSpec::flag("signature_detected"),
    FeatureSpec::flag("supported_issuer"),
    FeatureSpec::flag("routing_format_valid"),
    FeatureSpec::flag("routing_checksum_valid"),
    FeatureSpec::flag("account_number_valid"),
    FeatureSpec::flag("check_number_valid"),
    FeatureSpec::flag("future_dated"),
    FeatureSpec::flag("stale_dated"),
    FeatureSpec::bounded("check_age_days", 0.0, 365.0, 0.0),
    FeatureSpec::bounded("amount_magnitude", 0.0, SINGLE_AMOUNT_CAP, 0.0),
    FeatureSpec::flag("round_amount"),
    FeatureSpec::flag("high_value"),
    FeatureSpec::bounded("written_amount_consistency", 0.0, 1.0, 0.5),
    FeatureSpec::flag("payer_payee_distinct"),
    FeatureSpec::bounded("payer_address_quality", 0.0, 1.0, 0.0),
    FeatureSpec::bounded("payee_name_quality", 0.0, 1.0, 0.0),
    FeatureSpec::bounded("text_quality", 0.0, 1.0, 0.3),
    FeatureSpec::bounded("field_quality", 0.0, 1.0, 0.0),
    FeatureSpec::bounded("critical_missing_count", 0.0, 10.0, 0.0),
];

/// Paystub feature schema (22 features).
static PAYSTUB_SPECS: [FeatureSpec; 22] = [
    FeatureSpec::flag("has_employer_name"),
    FeatureSpec::flag("has_employee_name"),
    FeatureSpec::flag("has_period_start"),
    FeatureSpec::flag("has_period_end"),
    FeatureSpec::flag("has_gross_pay"),
    FeatureSpec::flag("has_net_pay"),
    FeatureSpec::flag("has_ytd_gross"),
    FeatureSpec::flag("has_ytd_net"),
    FeatureSpec::flag("period_ordered"),
    FeatureSpec::flag("future_period"),
    FeatureSpec::bounded("period_length_days", 0.0, 45.0, 0.0),
    FeatureSpec::bounded("gross_magnitude", 0.0, SINGLE_AMOUNT_CAP, 0.0),
    FeatureSpec::bounded("net_magnitude", 0.0, SINGLE_AMOUNT_CAP, 0.0),
    FeatureSpec::flag("net_not_exceeding_gross"),
    FeatureSpec::bounded("deduction_consistency", 0.0, 1.0, 0.5),
    FeatureSpec::flag("federal_tax_rate_plausible"),
    FeatureSpec::flag("social_security_rate_consistent"),
    FeatureSpec::flag("medicare_rate_consistent"),
    FeatureSpec::bounded("ytd_consistency", 0.0, 1.0, 0.5),
    FeatureSpec::bounded("critical_missing_count", 0.0, 10.0, 0.0),
    FeatureSpec::bounded("text_quality", 0.0, 1.0, 0.3),
    FeatureSpec::bounded("field_quality", 0.0, 1.0, 0.0),
];

/// Money order feature schema (18 features).
static MONEY_ORDER_SPECS: [FeatureSpec; 18] = [
    FeatureSpec::flag("has_issuer_name"),
    FeatureSpec::flag("has_serial_number"),
    FeatureSpec::flag("has_amount"),
    FeatureSpec::flag("has_purchaser_name"),
    FeatureSpec::flag("has_purchaser_address"),
    FeatureSpec::flag("has_payee_name"),
    FeatureSpec::flag("has_issue_date"),
    FeatureSpec::flag("supported_issuer"),
    FeatureSpec::flag("serial_format_valid"),
    FeatureSpec::flag("future_dated"),
    FeatureSpec::flag("stale_dated"),
    FeatureSpec::bounded("amount_magnitude", 0.0, MONEY_ORDER_AMOUNT_CAP, 0.0),
    FeatureSpec::flag("over_limit"),
    FeatureSpec::flag("round_amount"),
    FeatureSpec::flag("purchaser_payee_distinct"),
    FeatureSpec::bounded("critical_missing_count", 0.0, 10.0, 0.0),
    FeatureSpec::bounded("text_quality", 0.0, 1.0, 0.3),
    FeatureSpec::bounded("field_quality", 0.0, 1.0, 0.0),
];

/// Bank statement schema singleton.
pub static BANK_STATEMENT_SCHEMA: FeatureSchema =
    FeatureSchema::new(DocumentKind::BankStatement, &BANK_STATEMENT_SPECS);
/// Check schema singleton.
pub static CHECK_SCHEMA: FeatureSchema = FeatureSchema::new(DocumentKind::Check, &CHECK_SPECS);
/// Paystub schema singleton.
pub static PAYSTUB_SCHEMA: FeatureSchema =
    FeatureSchema::new(DocumentKind::Paystub, &PAYSTUB_SPECS);
/// Money order schema singleton.
pub static MONEY_ORDER_SCHEMA: FeatureSchema =
    FeatureSchema::new(DocumentKind::MoneyOrder, &MONEY_ORDER_SPECS);

/// The schema for a document kind.
pub fn schema_for(kind: DocumentKind) -> &'static FeatureSchema {
    match kind {
        DocumentKind::BankStatement => &BANK_STATEMENT_SCHEMA,
        DocumentKind::Check => &CHECK_SCHEMA,
        DocumentKind::Paystub => &PAYSTUB_SCHEMA,
        DocumentKind::MoneyOrder => &MONEY_ORDER_SCHEMA,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_widths_match_declared_counts() {
        for kind in DocumentKind::all() {
            let schema = schema_for(kind);
            assert_eq!(
                schema.len(),
                kind.feature_count(),
                "schema width mismatch for {kind}"
            );
            assert_eq!(schema.kind(), kind);
        }
    }

    #[test]
    fn test_feature_names_unique_within_schema() {
        for kind in DocumentKind::all() {
            let schema = schema_for(kind);
            let mut names: Vec<&str> = schema.specs().iter().map(|s| s.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), schema.len(), "duplicate feature name in {kind}");
        }
    }

    #[test]
    fn test_defaults_lie_within_ranges() {
        for kind in DocumentKind::all() {
            for spec in schema_for(kind).specs() {
                assert!(
                    spec.default >= spec.min && spec.default <= spec.max,
                    "default out of range for {}.{}",
                    kind,
                    spec.name
                );
            }
        }
    }
}
