//! Paystub feature extraction.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use docguard_core::Paystub;

use crate::schema::PAYSTUB_SCHEMA;
use crate::text::text_quality;

/// Deduction reconciliation tolerance bands, in dollars.
const DEDUCTION_EXACT_TOLERANCE: f64 = 1.0;
const DEDUCTION_NEAR_TOLERANCE: f64 = 10.0;

/// Statutory withholding rates.
const SOCIAL_SECURITY_RATE: f64 = 0.062;
const MEDICARE_RATE: f64 = 0.0145;
/// Relative slack allowed around a statutory rate before the check fails.
const RATE_SLACK: f64 = 0.20;

/// Federal withholding above this fraction of gross is implausible.
const MAX_FEDERAL_TAX_RATE: f64 = 0.45;

pub(crate) fn extract(doc: &Paystub, raw_text: &str, as_of: NaiveDate) -> Vec<f64> {
    let specs = PAYSTUB_SCHEMA.specs();
    let mut values = Vec::with_capacity(specs.len());
    let gross = doc.gross_pay.as_ref().map(|a| a.value);
    let net = doc.net_pay.as_ref().map(|a| a.value);

    for spec in specs {
        let raw = match spec.name {
            "has_employer_name" => presence(doc.employer_name.as_deref()),
            "has_employee_name" => presence(doc.employee_name.as_deref()),
            "has_period_start" => flag(doc.pay_period_start.is_some()),
            "has_period_end" => flag(doc.pay_period_end.is_some()),
            "has_gross_pay" => flag(doc.gross_pay.is_some()),
            "has_net_pay" => flag(doc.net_pay.is_some()),
            "has_ytd_gross" => flag(doc.ytd_gross.is_some()),
            "has_ytd_net" => flag(doc.ytd_net.is_some()),
            "period_ordered" => match (doc.pay_period_start, doc.pay_period_end) {
                (Some(start), Some(end)) => flag(start <= end),
                _ => spec.default,
            },
            "future_period" => flag(
                doc.pay_period_end.map(|d| d > as_of).unwrap_or(false)
                    || doc.pay_period_start.map(|d| d > as_of).unwrap_or(false),
            ),
            "period_length_days" => match (doc.pay_period_start, doc.pay_period_end) {
                (Some(start), Some(end)) if start <= end => (end - start).num_days() as f64,
                _ => spec.default,
            },
            "gross_magnitude" => gross.map(|g| decimal_abs(g)).unwrap_or(spec.default),
            "net_magnitude" => net.map(|n| decimal_abs(n)).unwrap_or(spec.default),
            "net_not_exceeding_gross" => match (gross, net) {
                (Some(g), Some(n)) => flag(n <= g),
                _ => spec.default,
            },
            "deduction_consistency" => deduction_consistency(doc, spec.default),
            "federal_tax_rate_plausible" => match (gross, doc.federal_tax.as_ref()) {
                (Some(g), Some(fed)) if g > Decimal::ZERO => {
                    let rate = (fed.value / g).to_f64().unwrap_or(1.0);
                    flag((0.0..=MAX_FEDERAL_TAX_RATE).contains(&rate))
                }
                _ => spec.default,
            },
            "social_security_rate_consistent" => {
                rate_consistent(gross, doc.social_security.as_ref(), SOCIAL_SECURITY_RATE)
                    .unwrap_or(spec.default)
            }
            "medicare_rate_consistent" => {
                rate_consistent(gross, doc.medicare.as_ref(), MEDICARE_RATE)
                    .unwrap_or(spec.default)
            }
            "ytd_consistency" => ytd_consistency(doc, spec.default),
            "critical_missing_count" => critical_missing(doc) as f64,
            "text_quality" => text_quality(raw_text),
            "field_quality" => field_quality(doc),
            other => unreachable!("undeclared paystub feature `{other}`"),
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

fn decimal_abs(value: Decimal) -> f64 {
    value.abs().to_f64().unwrap_or(0.0)
}

/// Gross should reconcile against net plus itemized withholdings, with the
/// same $1/$10 banding the statement reconciliation uses.
fn deduction_consistency(doc: &Paystub, default: f64) -> f64 {
    let (gross, net) = match (&doc.gross_pay, &doc.net_pay) {
        (Some(g), Some(n)) => (g.value, n.value),
        _ => return default,
    };
    let deductions = [
        &doc.federal_tax,
        &doc.state_tax,
        &doc.social_security,
        &doc.medicare,
    ]
    .iter()
    .filter_map(|d| d.as_ref().map(|a| a.value))
    .sum::<Decimal>();

    let difference = (gross - (net + deductions)).abs().to_f64().unwrap_or(f64::MAX);
    if difference <= DEDUCTION_EXACT_TOLERANCE {
        1.0
    } else if difference <= DEDUCTION_NEAR_TOLERANCE {
        0.5
    } else {
        0.0
    }
}

/// Whether a withholding matches its statutory rate within relative slack.
fn rate_consistent(
    gross: Option<Decimal>,
    withheld: Option<&docguard_core::MonetaryAmount>,
    statutory: f64,
) -> Option<f64> {
    let gross = gross?.to_f64().unwrap_or(0.0);
    let withheld = withheld?.to_f64();
    if gross <= 0.0 {
        return None;
    }
    let rate = withheld / gross;
    let lower = statutory * (1.0 - RATE_SLACK);
    let upper = statutory * (1.0 + RATE_SLACK);
    Some(flag((lower..=upper).contains(&rate)))
}

/// Year-to-date figures must dominate the period figures and order
/// consistently: scores 1.0 when both hold, 0.5 when one holds.
fn ytd_consistency(doc: &Paystub, default: f64) -> f64 {
    let checks: Vec<bool> = [
        match (&doc.ytd_gross, &doc.gross_pay) {
            (Some(ytd), Some(gross)) => Some(ytd.value >= gross.value),
            _ => None,
        },
        match (&doc.ytd_net, &doc.ytd_gross) {
            (Some(net), Some(gross)) => Some(net.value <= gross.value),
            _ => None,
        },
    ]
    .into_iter()
    .flatten()
    .collect();

    if checks.is_empty() {
        return default;
    }
    checks.iter().filter(|c| **c).count() as f64 / checks.len() as f64
}

fn field_quality(doc: &Paystub) -> f64 {
    let present = [
        doc.employer_name.is_some(),
        doc.employee_name.is_some(),
        doc.pay_period_start.is_some(),
        doc.pay_period_end.is_some(),
        doc.gross_pay.is_some(),
        doc.net_pay.is_some(),
        doc.ytd_gross.is_some(),
        doc.ytd_net.is_some(),
        doc.federal_tax.is_some(),
        doc.state_tax.is_some(),
        doc.social_security.is_some(),
        doc.medicare.is_some(),
    ];
    present.iter().filter(|p| **p).count() as f64 / present.len() as f64
}

fn critical_missing(doc: &Paystub) -> usize {
    [
        doc.employer_name.is_none(),
        doc.employee_name.is_none(),
        doc.pay_period_start.is_none(),
        doc.pay_period_end.is_none(),
        doc.gross_pay.is_none(),
        doc.net_pay.is_none(),
    ]
    .iter()
    .filter(|m| **m)
    .count()
}
