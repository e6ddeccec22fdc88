//! The history store seam.

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use docguard_core::{CustomerRecord, Decision, SubmissionFingerprint};

use crate::error::HistoryResult;

/// Keyed customer fraud history.
///
/// `commit` is atomic and happens exactly once per request, after the
/// decision record is otherwise finalized. For a given identity, commits
/// are totally ordered; callers serialize the duplicate check and the
/// commit under the guard from [`lock_identity`].
///
/// [`lock_identity`]: HistoryStore::lock_identity
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Acquire the per-identity critical-section guard.
    async fn lock_identity(&self, identity: &str) -> OwnedMutexGuard<()>;

    /// Fetch the record for an identity, if one exists.
    async fn lookup(&self, identity: &str) -> HistoryResult<Option<CustomerRecord>>;

    /// Whether a submission fingerprint is already on file for an identity.
    async fn has_fingerprint(
        &self,
        identity: &str,
        fingerprint: &SubmissionFingerprint,
    ) -> HistoryResult<bool>;

    /// Record a finalized decision: create the record lazily, bump the
    /// matching counter, insert the fingerprint, update last decision and
    /// last seen.
    async fn commit(
        &self,
        identity: &str,
        decision: Decision,
        fingerprint: Option<&SubmissionFingerprint>,
    ) -> HistoryResult<()>;
}
