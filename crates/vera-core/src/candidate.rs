use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One replica's output. Immutable once produced; candidates belong to a
/// single operation and are never shared across operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateResult {
    /// Index of the replica that produced this value
    pub replica_index: usize,

    /// Raw output value, opaque to the engine
    pub value: Value,

    /// When the replica finished producing
    pub produced_at: DateTime<Utc>,
}

impl CandidateResult {
    pub fn new(replica_index: usize, value: Value) -> Self {
        CandidateResult {
            replica_index,
            value,
            produced_at: Utc::now(),
        }
    }
}
