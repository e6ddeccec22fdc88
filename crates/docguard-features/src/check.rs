//! Check feature extraction.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use docguard_core::{normalize_identity, Check};

use crate::schema::CHECK_SCHEMA;
use crate::text::{address_quality, name_quality, parse_written_amount, text_quality};
use crate::validators::{
    is_supported_bank, is_valid_account_number, is_valid_check_number, is_valid_routing_format,
    routing_checksum_ok,
};

/// Checks older than this are stale-dated.
const STALE_AGE_DAYS: i64 = 180;
/// Checks at or above this amount are high-value.
const HIGH_VALUE_THRESHOLD: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
/// Written/numeric amounts must agree within one cent.
const AMOUNT_MATCH_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

pub(crate) fn extract(doc: &Check, raw_text: &str, as_of: NaiveDate) -> Vec<f64> {
    let specs = CHECK_SCHEMA.specs();
    let mut values = Vec::with_capacity(specs.len());
    let age_days = doc.check_date.map(|d| (as_of - d).num_days());

    for spec in specs {
        let raw = match spec.name {
            "has_bank_name" => presence(doc.bank_name.as_deref()),
            "has_routing_number" => presence(doc.routing_number.as_deref()),
            "has_account_number" => presence(doc.account_number.as_deref()),
            "has_check_number" => presence(doc.check_number.as_deref()),
            "has_amount_numeric" => flag(doc.amount_numeric.is_some()),
            "has_amount_written" => presence(doc.amount_written.as_deref()),
            "has_payer_name" => presence(doc.payer_name.as_deref()),
            "has_payer_address" => presence(doc.payer_address.as_deref()),
            "has_payee_name" => presence(doc.payee_name.as_deref()),
            "has_check_date" => flag(doc.check_date.is_some()),
            "has_memo" => presence(doc.memo.as_deref()),
            "signature_detected" => flag(doc.signature_detected == Some(true)),
            "supported_issuer" => doc
                .bank_name
                .as_deref()
                .map(|n| flag(is_supported_bank(n)))
                .unwrap_or(spec.default),
            "routing_format_valid" => doc
                .routing_number
                .as_deref()
                .map(|r| flag(is_valid_routing_format(r)))
                .unwrap_or(spec.default),
            "routing_checksum_valid" => doc
                .routing_number
                .as_deref()
                .map(|r| flag(routing_checksum_ok(r)))
                .unwrap_or(spec.default),
            "account_number_valid" => doc
                .account_number
                .as_deref()
                .map(|a| flag(is_valid_account_number(a)))
                .unwrap_or(spec.default),
            "check_number_valid" => doc
                .check_number
                .as_deref()
                .map(|c| flag(is_valid_check_number(c)))
                .unwrap_or(spec.default),
            "future_dated" => flag(age_days.map(|d| d < 0).unwrap_or(false)),
            "stale_dated" => flag(age_days.map(|d| d > STALE_AGE_DAYS).unwrap_or(false)),
            "check_age_days" => age_days.map(|d| d.max(0) as f64).unwrap_or(spec.default),
            "amount_magnitude" => doc
                .amount_numeric
                .as_ref()
                .map(|a| a.to_f64().abs())
                .unwrap_or(spec.default),
            "round_amount" => doc
                .amount_numeric
                .as_ref()
                .map(|a| flag(is_round(&a.value)))
                .unwrap_or(spec.default),
            "high_value" => doc
                .amount_numeric
                .as_ref()
                .map(|a| flag(a.value.abs() >= HIGH_VALUE_THRESHOLD))
                .unwrap_or(spec.default),
            "written_amount_consistency" => written_amount_consistency(doc, spec.default),
            "payer_payee_distinct" => parties_distinct(
                doc.payer_name.as_deref(),
                doc.payee_name.as_deref(),
                spec.default,
            ),
            "payer_address_quality" => doc
                .payer_address
                .as_deref()
                .map(address_quality)
                .unwrap_or(spec.default),
            "payee_name_quality" => doc
                .payee_name
                .as_deref()
                .map(name_quality)
                .unwrap_or(spec.default),
            "text_quality" => text_quality(raw_text),
            "field_quality" => field_quality(doc),
            "critical_missing_count" => critical_missing(doc) as f64,
            other => unreachable!("undeclared check feature `{other}`"),
        };
        values.push(spec.clamp(raw));
    }
    values
}

fn presence(field: Option<&str>) -> f64 {
    flag(field.map(|s| !s.trim().is_empty()).unwrap_or(false))
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

fn is_round(value: &Decimal) -> bool {
    let abs = value.abs();
    abs >= Decimal::new(100, 0) && abs.fract().is_zero() && (abs % Decimal::new(100, 0)).is_zero()
}

/// Courtesy-line agreement: both amounts present and the written line
/// parses to within one cent of the numeric amount scores 1.0; a missing
/// or unparseable line keeps the neutral default; a parsed mismatch
/// scores 0.0.
fn written_amount_consistency(doc: &Check, default: f64) -> f64 {
    let numeric = match &doc.amount_numeric {
        Some(a) => a.value,
        None => return default,
    };
    let written = match doc.amount_written.as_deref() {
        Some(w) if !w.trim().is_empty() => w,
        _ => return default,
    };
    match parse_written_amount(written) {
        Some(parsed) if (parsed - numeric).abs() <= AMOUNT_MATCH_TOLERANCE => 1.0,
        Some(_) => 0.0,
        None => default,
    }
}

fn parties_distinct(payer: Option<&str>, payee: Option<&str>, default: f64) -> f64 {
    match (
        payer.and_then(normalize_identity),
        payee.and_then(normalize_identity),
    ) {
        (Some(a), Some(b)) => flag(a != b),
        _ => default,
    }
}

fn field_quality(doc: &Check) -> f64 {
    let present = [
        doc.bank_name.is_some(),
        doc.routing_number.is_some(),
        doc.account_number.is_some(),
        doc.check_number.is_some(),
        doc.amount_numeric.is_some(),
        doc.amount_written.is_some(),
        doc.payer_name.is_some(),
        doc.payer_address.is_some(),
        doc.payee_name.is_some(),
        doc.check_date.is_some(),
        doc.signature_detected.is_some(),
    ];
    present.iter().filter(|p| **p).count() as f64 / present.len() as f64
}

fn critical_missing(doc: &Check) -> usize {
    [
        doc.routing_number.is_none(),
        doc.account_number.is_none(),
        doc.check_number.is_none(),
        doc.amount_numeric.is_none(),
        doc.payer_name.is_none(),
        doc.payee_name.is_none(),
        doc.check_date.is_none(),
    ]
    .iter()
    .filter(|m| **m)
    .count()
}
