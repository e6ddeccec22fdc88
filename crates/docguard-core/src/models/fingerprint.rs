//! Submission fingerprints for duplicate detection.
//!
//! A fingerprint is a digest over the identity-plus-content tuple that
//! identifies a resubmission: for checks `(issuer, check number, normalized
//! payer)`, for statements `(account number, period start)`, for paystubs
//! `(employer, employee, period start)`, for money orders `(issuer, serial)`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::document::{normalize_identity, NormalizedDocument};

/// Separator between tuple parts before hashing; never appears in
/// normalized field content.
const PART_SEPARATOR: char = '\u{1f}';

/// A SHA-256 digest over a canonical per-kind submission tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionFingerprint {
    digest: String,
}

impl SubmissionFingerprint {
    /// Compute the fingerprint for a document.
    ///
    /// Returns `None` when the tuple fields the kind requires are absent,
    /// in which case duplicate detection is not possible for the request.
    pub fn from_document(doc: &NormalizedDocument) -> Option<Self> {
        match doc {
            NormalizedDocument::BankStatement(s) => {
                let account = normalize_part(s.account_number.as_deref())?;
                let period_start = s.statement_period_start_date?;
                Some(Self::from_parts(&[
                    "statement",
                    &account,
                    &period_start.to_string(),
                ]))
            }
            NormalizedDocument::Check(c) => {
                let issuer = normalize_part(c.bank_name.as_deref())?;
                let number = normalize_part(c.check_number.as_deref())?;
                let payer = c.payer_name.as_deref().and_then(normalize_identity)?;
                Some(Self::from_parts(&["check", &issuer, &number, &payer]))
            }
            NormalizedDocument::Paystub(p) => {
                let employer = normalize_part(p.employer_name.as_deref())?;
                let employee = p.employee_name.as_deref().and_then(normalize_identity)?;
                let period_start = p.pay_period_start?;
                Some(Self::from_parts(&[
                    "paystub",
                    &employer,
                    &employee,
                    &period_start.to_string(),
                ]))
            }
            NormalizedDocument::MoneyOrder(m) => {
                let issuer = normalize_part(m.issuer_name.as_deref())?;
                let serial = normalize_part(m.serial_number.as_deref())?;
                Some(Self::from_parts(&["money_order", &issuer, &serial]))
            }
        }
    }

    /// Digest a canonical tuple.
    fn from_parts(parts: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                hasher.update([PART_SEPARATOR as u8]);
            }
            hasher.update(part.as_bytes());
        }
        Self {
            digest: hex::encode(hasher.finalize()),
        }
    }

    /// The hex digest, the persisted representation.
    pub fn as_hex(&self) -> &str {
        &self.digest
    }
}

/// Normalize a non-identity tuple part: trim, collapse whitespace, lowercase.
fn normalize_part(raw: Option<&str>) -> Option<String> {
    raw.and_then(normalize_identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{BankStatement, Check};
    use chrono::NaiveDate;

    fn statement(account: Option<&str>, start: Option<NaiveDate>) -> NormalizedDocument {
        NormalizedDocument::BankStatement(BankStatement {
            bank_name: Some("Chase".into()),
            bank_address: None,
            account_holder_name: Some("John Smith".into()),
            account_holder_names: vec![],
            account_number: account.map(String::from),
            account_type: None,
            currency: Some("USD".into()),
            statement_period_start_date: start,
            statement_period_end_date: None,
            statement_date: None,
            beginning_balance: None,
            ending_balance: None,
            total_credits: None,
            total_debits: None,
            transactions: vec![],
        })
    }

    #[test]
    fn test_same_tuple_same_digest() {
        let start = NaiveDate::from_ymd_opt(2024, 10, 1);
        let a = SubmissionFingerprint::from_document(&statement(Some("4532887123456789"), start));
        let b = SubmissionFingerprint::from_document(&statement(Some("4532887123456789"), start));
        assert_eq!(a, b);
        assert!(a.is_some());
    }

    #[test]
    fn test_different_period_different_digest() {
        let a = SubmissionFingerprint::from_document(&statement(
            Some("4532887123456789"),
            NaiveDate::from_ymd_opt(2024, 10, 1),
        ));
        let b = SubmissionFingerprint::from_document(&statement(
            Some("4532887123456789"),
            NaiveDate::from_ymd_opt(2024, 11, 1),
        ));
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_tuple_field_yields_none() {
        let doc = statement(None, NaiveDate::from_ymd_opt(2024, 10, 1));
        assert_eq!(SubmissionFingerprint::from_document(&doc), None);
    }

    #[test]
    fn test_check_payer_is_normalized() {
        let mk = |payer: &str| {
            NormalizedDocument::Check(Check {
                bank_name: Some("Chase".into()),
                routing_number: None,
                account_number: None,
                check_number: Some("1042".into()),
                amount_numeric: None,
                amount_written: None,
                payer_name: Some(payer.into()),
                payer_address: None,
                payee_name: None,
                check_date: None,
                signature_detected: None,
                memo: None,
            })
        };
        let a = SubmissionFingerprint::from_document(&mk("Alice Corp"));
        let b = SubmissionFingerprint::from_document(&mk("  ALICE   corp "));
        assert_eq!(a, b);
    }
}
