//! Normalized document models.
//!
//! The external normalization layer projects issuer-specific OCR output into
//! these issuer-agnostic schemas. Absence is a first-class value: a field the
//! OCR could not recover is `None`, never an empty string or a zero amount.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::MonetaryAmount;

/// Document kinds supported by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    BankStatement,
    Check,
    Paystub,
    MoneyOrder,
}

impl DocumentKind {
    /// All supported kinds, in declaration order.
    pub fn all() -> [DocumentKind; 4] {
        [
            DocumentKind::BankStatement,
            DocumentKind::Check,
            DocumentKind::Paystub,
            DocumentKind::MoneyOrder,
        ]
    }

    /// Declared feature-vector width for this kind.
    ///
    /// Part of the contract between extractors, the scaler, and the models;
    /// it cannot vary at runtime.
    pub const fn feature_count(&self) -> usize {
        match self {
            DocumentKind::BankStatement => 35,
            DocumentKind::Check => 30,
            DocumentKind::Paystub => 22,
            DocumentKind::MoneyOrder => 18,
        }
    }

    /// Stable snake_case identifier, used for artifact directories.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::BankStatement => "bank_statement",
            DocumentKind::Check => "check",
            DocumentKind::Paystub => "paystub",
            DocumentKind::MoneyOrder => "money_order",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single statement transaction line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Posting date.
    pub date: Option<NaiveDate>,
    /// Raw description text.
    pub description: Option<String>,
    /// Signed amount: positive = credit, negative = debit.
    pub amount: Option<MonetaryAmount>,
}

/// Normalized bank statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankStatement {
    pub bank_name: Option<String>,
    pub bank_address: Option<String>,
    pub account_holder_name: Option<String>,
    /// Additional holders on joint accounts.
    #[serde(default)]
    pub account_holder_names: Vec<String>,
    pub account_number: Option<String>,
    pub account_type: Option<String>,
    /// ISO 4217; upstream defaults to "USD" when the statement omits it.
    pub currency: Option<String>,
    pub statement_period_start_date: Option<NaiveDate>,
    pub statement_period_end_date: Option<NaiveDate>,
    pub statement_date: Option<NaiveDate>,
    pub beginning_balance: Option<MonetaryAmount>,
    pub ending_balance: Option<MonetaryAmount>,
    pub total_credits: Option<MonetaryAmount>,
    pub total_debits: Option<MonetaryAmount>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

/// Normalized check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub bank_name: Option<String>,
    pub routing_number: Option<String>,
    pub account_number: Option<String>,
    pub check_number: Option<String>,
    pub amount_numeric: Option<MonetaryAmount>,
    /// The written (legal) amount line, verbatim.
    pub amount_written: Option<String>,
    pub payer_name: Option<String>,
    pub payer_address: Option<String>,
    pub payee_name: Option<String>,
    pub check_date: Option<NaiveDate>,
    /// Whether OCR detected a signature stroke in the signature region.
    pub signature_detected: Option<bool>,
    pub memo: Option<String>,
}

/// Normalized paystub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paystub {
    pub employer_name: Option<String>,
    pub employee_name: Option<String>,
    pub pay_period_start: Option<NaiveDate>,
    pub pay_period_end: Option<NaiveDate>,
    pub gross_pay: Option<MonetaryAmount>,
    pub net_pay: Option<MonetaryAmount>,
    pub ytd_gross: Option<MonetaryAmount>,
    pub ytd_net: Option<MonetaryAmount>,
    pub federal_tax: Option<MonetaryAmount>,
    pub state_tax: Option<MonetaryAmount>,
    pub social_security: Option<MonetaryAmount>,
    pub medicare: Option<MonetaryAmount>,
}

/// Normalized money order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyOrder {
    pub issuer_name: Option<String>,
    pub serial_number: Option<String>,
    pub amount: Option<MonetaryAmount>,
    pub purchaser_name: Option<String>,
    pub purchaser_address: Option<String>,
    pub payee_name: Option<String>,
    pub issue_date: Option<NaiveDate>,
}

/// Tagged union over the four supported document kinds.
///
/// Created by the external normalizer per request; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedDocument {
    BankStatement(BankStatement),
    Check(Check),
    Paystub(Paystub),
    MoneyOrder(MoneyOrder),
}

impl NormalizedDocument {
    /// The document kind tag.
    pub fn kind(&self) -> DocumentKind {
        match self {
            NormalizedDocument::BankStatement(_) => DocumentKind::BankStatement,
            NormalizedDocument::Check(_) => DocumentKind::Check,
            NormalizedDocument::Paystub(_) => DocumentKind::Paystub,
            NormalizedDocument::MoneyOrder(_) => DocumentKind::MoneyOrder,
        }
    }

    /// The customer identity key extracted from the document, normalized.
    ///
    /// Account-holder name for statements, payer for checks, employee for
    /// paystubs, purchaser for money orders. `None` when the identity field
    /// is absent or blank, which triggers the identity policy gate.
    pub fn identity_key(&self) -> Option<String> {
        let raw = match self {
            NormalizedDocument::BankStatement(s) => s.account_holder_name.as_deref(),
            NormalizedDocument::Check(c) => c.payer_name.as_deref(),
            NormalizedDocument::Paystub(p) => p.employee_name.as_deref(),
            NormalizedDocument::MoneyOrder(m) => m.purchaser_name.as_deref(),
        };
        raw.and_then(normalize_identity)
    }
}

/// Normalize an identity string: trim, collapse internal whitespace, lowercase.
///
/// Returns `None` for empty or whitespace-only input so that a blank OCR
/// field is treated as absent.
pub fn normalize_identity(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}
