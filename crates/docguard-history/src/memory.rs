//! In-memory history store.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use docguard_core::{CustomerRecord, Decision, SubmissionFingerprint};

use crate::error::{HistoryError, HistoryResult};
use crate::locks::IdentityLocks;
use crate::store::HistoryStore;

/// Process-local reference store; state dies with the process.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    records: RwLock<HashMap<String, CustomerRecord>>,
    locks: IdentityLocks,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record, for tests and migrations.
    pub fn insert_record(&self, record: CustomerRecord) -> HistoryResult<()> {
        let mut records = self.records.write().map_err(|_| HistoryError::Poisoned)?;
        records.insert(record.identity_key.clone(), record);
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn lock_identity(&self, identity: &str) -> OwnedMutexGuard<()> {
        self.locks.acquire(identity).await
    }

    async fn lookup(&self, identity: &str) -> HistoryResult<Option<CustomerRecord>> {
        let records = self.records.read().map_err(|_| HistoryError::Poisoned)?;
        Ok(records.get(identity).cloned())
    }

    async fn has_fingerprint(
        &self,
        identity: &str,
        fingerprint: &SubmissionFingerprint,
    ) -> HistoryResult<bool> {
        let records = self.records.read().map_err(|_| HistoryError::Poisoned)?;
        Ok(records
            .get(identity)
            .map(|r| r.contains_fingerprint(fingerprint))
            .unwrap_or(false))
    }

    async fn commit(
        &self,
        identity: &str,
        decision: Decision,
        fingerprint: Option<&SubmissionFingerprint>,
    ) -> HistoryResult<()> {
        let now = Utc::now();
        let mut records = self.records.write().map_err(|_| HistoryError::Poisoned)?;
        let record = records
            .entry(identity.to_string())
            .or_insert_with(|| CustomerRecord::new(identity, now));
        record.apply(decision, fingerprint, now);
        debug!(
            identity,
            %decision,
            fraud_count = record.fraud_count,
            escalate_count = record.escalate_count,
            "committed decision to history"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docguard_core::{BankStatement, NormalizedDocument};
    use chrono::NaiveDate;

    fn fingerprint() -> SubmissionFingerprint {
        let doc = NormalizedDocument::BankStatement(BankStatement {
            bank_name: Some("Chase".into()),
            bank_address: None,
            account_holder_name: Some("John Smith".into()),
            account_holder_names: vec![],
            account_number: Some("4532887123456789".into()),
            account_type: None,
            currency: None,
            statement_period_start_date: NaiveDate::from_ymd_opt(2024, 10, 1),
            statement_period_end_date: None,
            statement_date: None,
            beginning_balance: None,
            ending_balance: None,
            total_credits: None,
            total_debits: None,
            transactions: vec![],
        });
        SubmissionFingerprint::from_document(&doc).unwrap()
    }

    #[tokio::test]
    async fn test_commit_creates_record_lazily() {
        let store = InMemoryHistoryStore::new();
        assert!(store.lookup("john smith").await.unwrap().is_none());

        store
            .commit("john smith", Decision::Approve, Some(&fingerprint()))
            .await
            .unwrap();

        let record = store.lookup("john smith").await.unwrap().unwrap();
        assert_eq!(record.fraud_count, 0);
        assert_eq!(record.last_decision, Some(Decision::Approve));
        assert!(store
            .has_fingerprint("john smith", &fingerprint())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_counters_follow_decisions() {
        let store = InMemoryHistoryStore::new();
        store.commit("alice corp", Decision::Reject, None).await.unwrap();
        store.commit("alice corp", Decision::Reject, None).await.unwrap();
        store.commit("alice corp", Decision::Escalate, None).await.unwrap();

        let record = store.lookup("alice corp").await.unwrap().unwrap();
        assert_eq!(record.fraud_count, 2);
        assert_eq!(record.escalate_count, 1);
    }

    #[tokio::test]
    async fn test_unknown_identity_has_no_fingerprints() {
        let store = InMemoryHistoryStore::new();
        assert!(!store
            .has_fingerprint("nobody", &fingerprint())
            .await
            .unwrap());
    }
}
