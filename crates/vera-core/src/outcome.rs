use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::operation::PolicyKind;

/// Result of applying one agreement policy to a candidate set.
///
/// Rejection is a normal outcome, not an error: it feeds the fallback
/// loop. The canonical value is present iff the policy accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyOutcome {
    pub accepted: bool,

    /// The single value associated with acceptance
    pub canonical: Option<Value>,

    /// Diagnostic detail, populated on rejection
    pub detail: String,
}

impl PolicyOutcome {
    pub fn accepted(canonical: Value) -> Self {
        PolicyOutcome {
            accepted: true,
            canonical: Some(canonical),
            detail: String::new(),
        }
    }

    pub fn rejected(detail: impl Into<String>) -> Self {
        PolicyOutcome {
            accepted: false,
            canonical: None,
            detail: detail.into(),
        }
    }
}

/// Immutable record of one rejected policy attempt. The exhaustion
/// history is a list of these, exactly one per attempted policy, in
/// attempt order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptRecord {
    /// Policy level that was attempted
    pub policy: PolicyKind,

    /// Replicas the attempt asked the runner for
    pub replicas_requested: usize,

    /// Replicas that actually produced a candidate
    pub replicas_succeeded: usize,

    /// Why the attempt did not accept
    pub detail: String,
}
