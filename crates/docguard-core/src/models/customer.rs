//! Customer fraud history records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fingerprint::SubmissionFingerprint;
use super::verdict::Decision;

/// Customer classification derived from history counters and prior decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomerClass {
    /// No record, or counters all zero and no prior decision.
    New,
    /// Counters all zero with a prior decision on file.
    Clean,
    /// Prior rejects but no escalations.
    Fraud,
    /// At least one prior escalation.
    Repeat,
}

impl CustomerClass {
    /// Uppercase identifier matching the wire format.
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerClass::New => "NEW",
            CustomerClass::Clean => "CLEAN",
            CustomerClass::Fraud => "FRAUD",
            CustomerClass::Repeat => "REPEAT",
        }
    }

    /// Classify an optional record; a missing record is a new customer.
    pub fn of(record: Option<&CustomerRecord>) -> Self {
        record.map(CustomerRecord::class).unwrap_or(CustomerClass::New)
    }
}

impl std::fmt::Display for CustomerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted per-identity fraud history.
///
/// Created lazily on first keyed submission and mutated exactly once per
/// request, by the decision assembler, after the decision is final.
/// `fraud_count` and `escalate_count` are monotonically non-decreasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Normalized identity key.
    pub identity_key: String,
    /// Number of REJECT decisions issued for this identity.
    pub fraud_count: u32,
    /// Number of ESCALATE decisions issued for this identity.
    pub escalate_count: u32,
    /// Most recent decision, if any.
    pub last_decision: Option<Decision>,
    /// Timestamp of the most recent submission.
    pub last_seen: DateTime<Utc>,
    /// Fingerprint digests of all prior submissions, sorted for
    /// bit-exact serialization across processes.
    pub fingerprints: BTreeSet<String>,
}

impl CustomerRecord {
    /// Create a fresh record for a first submission.
    pub fn new(identity_key: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            identity_key: identity_key.into(),
            fraud_count: 0,
            escalate_count: 0,
            last_decision: None,
            last_seen: now,
            fingerprints: BTreeSet::new(),
        }
    }

    /// Classify this record.
    pub fn class(&self) -> CustomerClass {
        if self.escalate_count > 0 {
            CustomerClass::Repeat
        } else if self.fraud_count > 0 {
            CustomerClass::Fraud
        } else if self.last_decision.is_some() {
            CustomerClass::Clean
        } else {
            CustomerClass::New
        }
    }

    /// Apply a finalized decision: bump the matching counter, record the
    /// fingerprint, update last decision and last seen.
    pub fn apply(
        &mut self,
        decision: Decision,
        fingerprint: Option<&SubmissionFingerprint>,
        now: DateTime<Utc>,
    ) {
        match decision {
            Decision::Reject => self.fraud_count += 1,
            Decision::Escalate => self.escalate_count += 1,
            Decision::Approve => {}
        }
        if let Some(fp) = fingerprint {
            self.fingerprints.insert(fp.as_hex().to_string());
        }
        self.last_decision = Some(decision);
        self.last_seen = now;
    }

    /// Whether a fingerprint digest is already on file.
    pub fn contains_fingerprint(&self, fingerprint: &SubmissionFingerprint) -> bool {
        self.fingerprints.contains(fingerprint.as_hex())
    }
}

/// Read-only history summary handed to components outside the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub class: CustomerClass,
    pub fraud_count: u32,
    pub escalate_count: u32,
    pub last_decision: Option<Decision>,
}

impl CustomerSummary {
    /// Summarize an optional record; a missing record summarizes as new.
    pub fn of(record: Option<&CustomerRecord>) -> Self {
        match record {
            Some(r) => Self {
                class: r.class(),
                fraud_count: r.fraud_count,
                escalate_count: r.escalate_count,
                last_decision: r.last_decision,
            },
            None => Self {
                class: CustomerClass::New,
                fraud_count: 0,
                escalate_count: 0,
                last_decision: None,
            },
        }
    }
}
