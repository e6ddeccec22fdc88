//! Bank statement feature extraction.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use docguard_core::{BankStatement, Transaction};

use crate::schema::{BANK_STATEMENT_SCHEMA, LARGE_TRANSACTION_THRESHOLD};
use crate::text::text_quality;
use crate::validators::{is_supported_bank, is_valid_account_number};

/// Currencies the scoring models were trained on.
const SUPPORTED_CURRENCIES: &[&str] = &["USD", "CAD", "EUR", "GBP"];

/// Balance reconciliation tolerance bands, in dollars.
const BALANCE_EXACT_TOLERANCE: f64 = 1.0;
const BALANCE_NEAR_TOLERANCE: f64 = 10.0;

pub(crate) fn extract(doc: &BankStatement, raw_text: &str, as_of: NaiveDate) -> Vec<f64> {
    let specs = BANK_STATEMENT_SCHEMA.specs();
    let mut values = Vec::with_capacity(specs.len());
    let stats = TransactionStats::compute(&doc.transactions, doc);
    let (credits, debits) = reconstituted_totals(doc);

    for spec in specs {
        let raw = match spec.name {
            "has_bank_name" => presence(doc.bank_name.as_deref()),
            "has_account_holder_name" => presence(doc.account_holder_name.as_deref()),
            "has_account_number" => presence(doc.account_number.as_deref()),
            "has_account_type" => presence(doc.account_type.as_deref()),
            "has_period_start" => flag(doc.statement_period_start_date.is_some()),
            "has_period_end" => flag(doc.statement_period_end_date.is_some()),
            "has_statement_date" => flag(doc.statement_date.is_some()),
            "has_beginning_balance" => flag(doc.beginning_balance.is_some()),
            "has_ending_balance" => flag(doc.ending_balance.is_some()),
            "supported_issuer" => doc
                .bank_name
                .as_deref()
                .map(|n| flag(is_supported_bank(n)))
                .unwrap_or(spec.default),
            "account_number_valid" => doc
                .account_number
                .as_deref()
                .map(|n| flag(is_valid_account_number(n)))
                .unwrap_or(spec.default),
            "currency_supported" => doc
                .currency
                .as_deref()
                .map(|c| flag(SUPPORTED_CURRENCIES.contains(&c.trim().to_uppercase().as_str())))
                .unwrap_or(spec.default),
            "period_ordered" => match (doc.statement_period_start_date, doc.statement_period_end_date)
            {
                (Some(start), Some(end)) => flag(start <= end),
                _ => spec.default,
            },
            "future_period" => {
                let end_future = doc
                    .statement_period_end_date
                    .map(|d| d > as_of)
                    .unwrap_or(false);
                let stmt_future = doc.statement_date.map(|d| d > as_of).unwrap_or(false);
                flag(end_future || stmt_future)
            }
            "period_length_days" => {
                match (doc.statement_period_start_date, doc.statement_period_end_date) {
                    (Some(start), Some(end)) if start <= end => {
                        (end - start).num_days() as f64
                    }
                    _ => spec.default,
                }
            }
            "beginning_balance_magnitude" => magnitude(doc.beginning_balance.as_ref()),
            "ending_balance_magnitude" => magnitude(doc.ending_balance.as_ref()),
            "negative_ending_balance" => doc
                .ending_balance
                .as_ref()
                .map(|b| flag(b.is_negative()))
                .unwrap_or(spec.default),
            "total_credits_magnitude" => credits.to_f64().unwrap_or(0.0),
            "total_debits_magnitude" => debits.to_f64().unwrap_or(0.0),
            "balance_consistency" => balance_consistency(doc, credits, debits, spec.default),
            "transaction_count" => stats.count as f64,
            "avg_transaction_amount" => stats.avg_abs_amount,
            "max_transaction_amount" => stats.max_abs_amount,
            "round_amount_count" => stats.round_count as f64,
            "round_amount_ratio" => stats.round_ratio,
            "large_transaction_count" => stats.large_count as f64,
            "weekend_ratio" => stats.weekend_ratio,
            "duplicate_transaction_count" => stats.duplicate_count as f64,
            "out_of_period_count" => stats.out_of_period_count as f64,
            "balance_volatility" => stats.balance_volatility(),
            "credit_debit_ratio" => credit_debit_ratio(credits, debits),
            "text_quality" => text_quality(raw_text),
            "field_quality" => field_quality(doc),
            "critical_missing_count" => critical_missing(doc) as f64,
            other => unreachable!("undeclared bank statement feature `{other}`"),
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

fn magnitude(amount: Option<&docguard_core::MonetaryAmount>) -> f64 {
    amount.map(|a| a.to_f64().abs()).unwrap_or(0.0)
}

/// Period totals, reconstituted from the transaction list when upstream OCR
/// dropped them: positive amounts sum to credits, absolute negative amounts
/// to debits.
pub(crate) fn reconstituted_totals(doc: &BankStatement) -> (Decimal, Decimal) {
    let stated_credits = doc
        .total_credits
        .as_ref()
        .map(|a| a.value.abs())
        .filter(|v| !v.is_zero());
    let stated_debits = doc
        .total_debits
        .as_ref()
        .map(|a| a.value.abs())
        .filter(|v| !v.is_zero());

    if let (Some(credits), Some(debits)) = (&stated_credits, &stated_debits) {
        return (*credits, *debits);
    }

    let mut summed_credits = Decimal::ZERO;
    let mut summed_debits = Decimal::ZERO;
    for txn in &doc.transactions {
        if let Some(amount) = &txn.amount {
            if amount.value.is_sign_positive() {
                summed_credits += amount.value;
            } else {
                summed_debits += amount.value.abs();
            }
        }
    }
    (
        stated_credits.unwrap_or(summed_credits),
        stated_debits.unwrap_or(summed_debits),
    )
}

/// The balance-consistency predicate: `expected_ending = beginning +
/// credits - debits`; within $1 scores 1.0, within $10 scores 0.5,
/// otherwise 0.0. Unverifiable balances keep the schema default.
fn balance_consistency(
    doc: &BankStatement,
    credits: Decimal,
    debits: Decimal,
    default: f64,
) -> f64 {
    let (beginning, ending) = match (&doc.beginning_balance, &doc.ending_balance) {
        (Some(b), Some(e)) => (b.value, e.value),
        _ => return default,
    };
    let expected = beginning + credits - debits;
    let difference = (ending - expected).abs().to_f64().unwrap_or(f64::MAX);
    if difference <= BALANCE_EXACT_TOLERANCE {
        1.0
    } else if difference <= BALANCE_NEAR_TOLERANCE {
        0.5
    } else {
        0.0
    }
}

fn credit_debit_ratio(credits: Decimal, debits: Decimal) -> f64 {
    let credits = credits.to_f64().unwrap_or(0.0);
    let debits = debits.to_f64().unwrap_or(0.0);
    if debits <= f64::EPSILON {
        if credits <= f64::EPSILON {
            1.0
        } else {
            10.0
        }
    } else {
        credits / debits
    }
}

/// Fraction of the standardized statement fields that are present.
fn field_quality(doc: &BankStatement) -> f64 {
    let present = [
        doc.bank_name.is_some(),
        doc.account_holder_name.is_some(),
        doc.account_number.is_some(),
        doc.account_type.is_some(),
        doc.currency.is_some(),
        doc.statement_period_start_date.is_some(),
        doc.statement_period_end_date.is_some(),
        doc.statement_date.is_some(),
        doc.beginning_balance.is_some(),
        doc.ending_balance.is_some(),
        doc.total_credits.is_some(),
        doc.total_debits.is_some(),
    ];
    present.iter().filter(|p| **p).count() as f64 / present.len() as f64
}

/// Count of absent identity- and balance-critical fields.
fn critical_missing(doc: &BankStatement) -> usize {
    [
        doc.bank_name.is_none(),
        doc.account_holder_name.is_none(),
        doc.account_number.is_none(),
        doc.statement_period_start_date.is_none(),
        doc.statement_period_end_date.is_none(),
        doc.statement_date.is_none(),
        doc.beginning_balance.is_none(),
        doc.ending_balance.is_none(),
    ]
    .iter()
    .filter(|m| **m)
    .count()
}

struct TransactionStats {
    count: usize,
    avg_abs_amount: f64,
    max_abs_amount: f64,
    round_count: usize,
    round_ratio: f64,
    large_count: usize,
    weekend_ratio: f64,
    duplicate_count: usize,
    out_of_period_count: usize,
    running_balances: Vec<f64>,
}

impl TransactionStats {
    fn compute(transactions: &[Transaction], doc: &BankStatement) -> Self {
        let count = transactions.len();
        let amounts: Vec<f64> = transactions
            .iter()
            .filter_map(|t| t.amount.as_ref())
            .map(|a| a.to_f64())
            .collect();

        let abs_amounts: Vec<f64> = amounts.iter().map(|a| a.abs()).collect();
        let avg_abs_amount = if abs_amounts.is_empty() {
            0.0
        } else {
            abs_amounts.iter().sum::<f64>() / abs_amounts.len() as f64
        };
        let max_abs_amount = abs_amounts.iter().cloned().fold(0.0, f64::max);

        let round_count = transactions
            .iter()
            .filter_map(|t| t.amount.as_ref())
            .filter(|a| is_round_amount(&a.value))
            .count();
        let round_ratio = if count == 0 {
            0.0
        } else {
            round_count as f64 / count as f64
        };

        let large_count = abs_amounts
            .iter()
            .filter(|a| **a >= LARGE_TRANSACTION_THRESHOLD)
            .count();

        let dated: Vec<NaiveDate> = transactions.iter().filter_map(|t| t.date).collect();
        let weekend = dated
            .iter()
            .filter(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .count();
        let weekend_ratio = if dated.is_empty() {
            0.0
        } else {
            weekend as f64 / dated.len() as f64
        };

        let duplicate_count = count_duplicates(transactions);

        let out_of_period_count = match (
            doc.statement_period_start_date,
            doc.statement_period_end_date,
        ) {
            (Some(start), Some(end)) if start <= end => dated
                .iter()
                .filter(|d| **d < start || **d > end)
                .count(),
            _ => 0,
        };

        let mut running = Vec::with_capacity(amounts.len());
        let mut balance = doc
            .beginning_balance
            .as_ref()
            .map(|b| b.to_f64())
            .unwrap_or(0.0);
        for amount in &amounts {
            balance += amount;
            running.push(balance);
        }

        Self {
            count,
            avg_abs_amount,
            max_abs_amount,
            round_count,
            round_ratio,
            large_count,
            weekend_ratio,
            duplicate_count,
            out_of_period_count,
            running_balances: running,
        }
    }

    /// Normalized dispersion of the running balance: population standard
    /// deviation over `1 + |mean|`, clamped to [0, 1] by the schema.
    fn balance_volatility(&self) -> f64 {
        if self.running_balances.len() < 2 {
            return 0.0;
        }
        let n = self.running_balances.len() as f64;
        let mean = self.running_balances.iter().sum::<f64>() / n;
        let variance = self
            .running_balances
            .iter()
            .map(|b| (b - mean).powi(2))
            .sum::<f64>()
            / n;
        variance.sqrt() / (1.0 + mean.abs())
    }
}

/// Round amounts: whole dollars divisible by 100, at least 100.
fn is_round_amount(value: &Decimal) -> bool {
    let abs = value.abs();
    abs >= Decimal::new(100, 0) && abs.fract().is_zero() && (abs % Decimal::new(100, 0)).is_zero()
}

/// Two transactions are duplicates iff normalized description, amount, and
/// date all coincide.
fn count_duplicates(transactions: &[Transaction]) -> usize {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    let mut duplicates = 0;
    for txn in transactions {
        let key = (
            txn.description
                .as_deref()
                .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()),
            txn.amount.as_ref().map(|a| a.value),
            txn.date,
        );
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    duplicates
}
