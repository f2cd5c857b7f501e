// LEDGER ENTRIES
// Immutable record of one completed operation: the terminal verdict, how
// many replica executions it took, and the rejection history of every
// policy attempted before the terminal one. Written exactly once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use vera_core::normalize::canonical_form;
use vera_core::{AttemptRecord, PolicyKind};

/// Terminal verdict of an operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Verdict {
    /// Some policy accepted. The digest commits to the canonical form of
    /// the accepted value.
    Accepted {
        value: Value,
        policy: PolicyKind,
        value_digest: String,
    },

    /// Every configured policy rejected
    Exhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerEntry {
    pub operation_id: String,

    pub verdict: Verdict,

    /// Total replica executions across all attempts
    pub replicas_run: usize,

    /// Rejected attempts in attempt order, one record per policy tried
    pub attempts: Vec<AttemptRecord>,

    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn accepted(
        operation_id: impl Into<String>,
        value: Value,
        policy: PolicyKind,
        replicas_run: usize,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        let value_digest = digest_value(&value);
        LedgerEntry {
            operation_id: operation_id.into(),
            verdict: Verdict::Accepted {
                value,
                policy,
                value_digest,
            },
            replicas_run,
            attempts,
            recorded_at: Utc::now(),
        }
    }

    pub fn exhausted(
        operation_id: impl Into<String>,
        replicas_run: usize,
        attempts: Vec<AttemptRecord>,
    ) -> Self {
        LedgerEntry {
            operation_id: operation_id.into(),
            verdict: Verdict::Exhausted,
            replicas_run,
            attempts,
            recorded_at: Utc::now(),
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.verdict, Verdict::Accepted { .. })
    }
}

/// SHA-256 over the canonical form, hex-encoded.
fn digest_value(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_form(value).as_bytes());
    hex::encode(hasher.finalize())
}
