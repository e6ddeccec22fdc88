//! Money order feature extraction.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use docguard_core::{normalize_identity, MoneyOrder};

use crate::schema::{MONEY_ORDER_AMOUNT_CAP, MONEY_ORDER_SCHEMA};
use crate::text::text_quality;
use crate::validators::{is_supported_money_order_issuer, is_valid_serial_number};

/// Money orders older than this are stale.
const STALE_AGE_DAYS: i64 = 180;

pub(crate) fn extract(doc: &MoneyOrder, raw_text: &str, as_of: NaiveDate) -> Vec<f64> {
    let specs = MONEY_ORDER_SCHEMA.specs();
    let mut values = Vec::with_capacity(specs.len());
    let age_days = doc.issue_date.map(|d| (as_of - d).num_days());

    for spec in specs {
        let raw = match spec.name {
            "has_issuer_name" => presence(doc.issuer_name.as_deref()),
            "has_serial_number" => presence(doc.serial_number.as_deref()),
            "has_amount" => flag(doc.amount.is_some()),
            "has_purchaser_name" => presence(doc.purchaser_name.as_deref()),
            "has_purchaser_address" => presence(doc.purchaser_address.as_deref()),
            "has_payee_name" => presence(doc.payee_name.as_deref()),
            "has_issue_date" => flag(doc.issue_date.is_some()),
            "supported_issuer" => doc
                .issuer_name
                .as_deref()
                .map(|n| flag(is_supported_money_order_issuer(n)))
                .unwrap_or(spec.default),
            "serial_format_valid" => doc
                .serial_number
                .as_deref()
                .map(|s| flag(is_valid_serial_number(s)))
                .unwrap_or(spec.default),
            "future_dated" => flag(age_days.map(|d| d < 0).unwrap_or(false)),
            "stale_dated" => flag(age_days.map(|d| d > STALE_AGE_DAYS).unwrap_or(false)),
            "amount_magnitude" => doc
                .amount
                .as_ref()
                .map(|a| a.to_f64().abs())
                .unwrap_or(spec.default),
            "over_limit" => doc
                .amount
                .as_ref()
                .map(|a| flag(a.to_f64().abs() > MONEY_ORDER_AMOUNT_CAP))
                .unwrap_or(spec.default),
            "round_amount" => doc
                .amount
                .as_ref()
                .map(|a| flag(is_round(&a.value)))
                .unwrap_or(spec.default),
            "purchaser_payee_distinct" => match (
                doc.purchaser_name.as_deref().and_then(normalize_identity),
                doc.payee_name.as_deref().and_then(normalize_identity),
            ) {
                (Some(a), Some(b)) => flag(a != b),
                _ => spec.default,
            },
            "critical_missing_count" => critical_missing(doc) as f64,
            "text_quality" => text_quality(raw_text),
            "field_quality" => field_quality(doc),
            other => unreachable!("undeclared money order feature `{other}`"),
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
    abs >= Decimal::new(50, 0) && abs.fract().is_zero() && (abs % Decimal::new(50, 0)).is_zero()
}

fn field_quality(doc: &MoneyOrder) -> f64 {
    let present = [
        doc.issuer_name.is_some(),
        doc.serial_number.is_some(),
        doc.amount.is_some(),
        doc.purchaser_name.is_some(),
        doc.purchaser_address.is_some(),
        doc.payee_name.is_some(),
        doc.issue_date.is_some(),
    ];
    present.iter().filter(|p| **p).count() as f64 / present.len() as f64
}

fn critical_missing(doc: &MoneyOrder) -> usize {
    [
        doc.issuer_name.is_none(),
        doc.serial_number.is_none(),
        doc.amount.is_none(),
        doc.purchaser_name.is_none(),
        doc.payee_name.is_none(),
    ]
    .iter()
    .filter(|m| **m)
    .count()
}
