//! JSON-file history store.
//!
//! The reference persistent store: the full record map is serialized as
//! canonical JSON (sorted identities, sorted fingerprint digests) so that
//! counters and fingerprints replay bit-exactly across processes. Writes
//! go through a temp file and an atomic rename; a torn write can never
//! corrupt the snapshot.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info};

use docguard_core::{CustomerRecord, Decision, SubmissionFingerprint};

use crate::error::{HistoryError, HistoryResult};
use crate::locks::IdentityLocks;
use crate::store::HistoryStore;

/// File-backed history store.
pub struct JsonFileHistoryStore {
    path: PathBuf,
    records: RwLock<BTreeMap<String, CustomerRecord>>,
    locks: IdentityLocks,
}

impl JsonFileHistoryStore {
    /// Open a store, loading the existing snapshot when present.
    ///
    /// A corrupt snapshot is a construction error, not a silent reset.
    pub fn open(path: impl Into<PathBuf>) -> HistoryResult<Self> {
        let path = path.into();
        let records = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let records: BTreeMap<String, CustomerRecord> = serde_json::from_str(&content)?;
            info!(path = %path.display(), identities = records.len(), "loaded history snapshot");
            records
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            records: RwLock::new(records),
            locks: IdentityLocks::new(),
        })
    }

    /// The snapshot path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, records: &BTreeMap<String, CustomerRecord>) -> HistoryResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(records)?;
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonFileHistoryStore {
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
            "committed decision to history snapshot"
        );
        self.persist(&records)
    }
}
