//! The feature extractor facade.

use chrono::NaiveDate;
use tracing::debug;

use docguard_core::{ContractResult, FeatureVector, NormalizedDocument};

use crate::schema::schema_for;
use crate::{check, money_order, paystub, statement};

/// Projects a normalized document plus raw OCR text into the kind's
/// declared feature vector.
///
/// Pure and deterministic: the reference date for future/stale predicates
/// is fixed at construction, so the same inputs always produce the same
/// vector.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    as_of: NaiveDate,
}

impl FeatureExtractor {
    /// Build an extractor with the given reference date.
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    /// The reference date in force.
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Extract the declared feature vector for a document.
    ///
    /// The output always has exactly `kind.feature_count()` finite values,
    /// each within its declared range; a violation is a contract error,
    /// not a fallback condition.
    pub fn extract(
        &self,
        doc: &NormalizedDocument,
        raw_text: &str,
    ) -> ContractResult<FeatureVector> {
        let values = match doc {
            NormalizedDocument::BankStatement(s) => statement::extract(s, raw_text, self.as_of),
            NormalizedDocument::Check(c) => check::extract(c, raw_text, self.as_of),
            NormalizedDocument::Paystub(p) => paystub::extract(p, raw_text, self.as_of),
            NormalizedDocument::MoneyOrder(m) => money_order::extract(m, raw_text, self.as_of),
        };
        let vector = FeatureVector::new(schema_for(doc.kind()), values)?;
        debug!(
            kind = %doc.kind(),
            width = vector.len(),
            "extracted feature vector"
        );
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docguard_core::{DocumentKind, MoneyOrder};
    use proptest::prelude::*;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(NaiveDate::from_ymd_opt(2024, 11, 1).unwrap())
    }

    #[test]
    fn test_extraction_matches_declared_width() {
        let doc = NormalizedDocument::MoneyOrder(MoneyOrder {
            issuer_name: Some("MoneyGram".into()),
            serial_number: Some("987654321012".into()),
            amount: None,
            purchaser_name: None,
            purchaser_address: None,
            payee_name: None,
            issue_date: None,
        });
        let vector = extractor().extract(&doc, "").unwrap();
        assert_eq!(vector.len(), DocumentKind::MoneyOrder.feature_count());
    }

    proptest! {
        /// Every extracted vector satisfies the kind contract regardless of
        /// how sparse the document is.
        #[test]
        fn prop_sparse_money_orders_stay_in_contract(
            has_issuer in any::<bool>(),
            has_serial in any::<bool>(),
            has_payee in any::<bool>(),
            cents in 0u64..500_000,
        ) {
            let doc = NormalizedDocument::MoneyOrder(MoneyOrder {
                issuer_name: has_issuer.then(|| "Western Union".to_string()),
                serial_number: has_serial.then(|| "1234567890".to_string()),
                amount: Some(docguard_core::MonetaryAmount::usd(
                    rust_decimal::Decimal::new(cents as i64, 2),
                )),
                purchaser_name: Some("Carlos Vega".to_string()),
                purchaser_address: None,
                payee_name: has_payee.then(|| "City Utilities".to_string()),
                issue_date: None,
            });
            let vector = extractor().extract(&doc, "short text").unwrap();
            prop_assert_eq!(vector.len(), 18);
            for (&value, spec) in vector.values().iter().zip(vector.schema().specs()) {
                prop_assert!(value.is_finite());
                prop_assert!(value >= spec.min && value <= spec.max);
            }
        }
    }
}
