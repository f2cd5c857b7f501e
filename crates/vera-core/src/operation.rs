// OPERATION REQUESTS AND POLICY SPECIFICATIONS
// Typed description of one unit of work and the agreement policies
// that will judge its replica outputs.
//
// SAFETY INVARIANTS:
// 1. A request is validated before any replica runs
// 2. Policy lists are non-empty and strictly decreasing in strictness
// 3. Configuration errors are fatal, never folded into policy rejections

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Agreement policy levels, ordered from most to least strict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    /// All replica outputs must share one canonical form
    Strict,

    /// Replica outputs must be judged equivalent under a stated principle
    Comparative,

    /// A single replica output must pass a judged quality bar
    NonComparative,
}

impl PolicyKind {
    /// Strictness rank: higher means stricter. Policy lists must be
    /// strictly decreasing in this rank.
    pub fn strictness_rank(&self) -> u8 {
        match self {
            PolicyKind::Strict => 2,
            PolicyKind::Comparative => 1,
            PolicyKind::NonComparative => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Strict => "strict",
            PolicyKind::Comparative => "comparative",
            PolicyKind::NonComparative => "non-comparative",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full specification of one agreement policy, including the directives
/// the external judge needs for the judged levels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicySpec {
    /// Byte-level agreement after deterministic normalization
    Strict,

    /// Judged group equivalence under an opaque comparison directive
    Comparative { principle: String },

    /// Judged quality assessment of a single candidate
    NonComparative { task: String, criteria: String },
}

impl PolicySpec {
    pub fn kind(&self) -> PolicyKind {
        match self {
            PolicySpec::Strict => PolicyKind::Strict,
            PolicySpec::Comparative { .. } => PolicyKind::Comparative,
            PolicySpec::NonComparative { .. } => PolicyKind::NonComparative,
        }
    }

    /// Check the judge directives this spec carries. Empty directives are
    /// configuration errors: the judge cannot act on them, and silently
    /// treating them as rejections would mask the caller's mistake.
    pub fn validate(&self) -> Result<(), RequestError> {
        match self {
            PolicySpec::Strict => Ok(()),
            PolicySpec::Comparative { principle } => {
                if principle.trim().is_empty() {
                    return Err(RequestError::EmptyDirective {
                        policy: PolicyKind::Comparative,
                        field: "principle",
                    });
                }
                Ok(())
            }
            PolicySpec::NonComparative { task, criteria } => {
                if task.trim().is_empty() {
                    return Err(RequestError::EmptyDirective {
                        policy: PolicyKind::NonComparative,
                        field: "task",
                    });
                }
                if criteria.trim().is_empty() {
                    return Err(RequestError::EmptyDirective {
                        policy: PolicyKind::NonComparative,
                        field: "criteria",
                    });
                }
                Ok(())
            }
        }
    }
}

/// Request validation errors. All of these are caller mistakes and are
/// surfaced before any replica runs.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestError {
    #[error("operation id must not be empty")]
    EmptyOperationId,

    #[error("replica count must be at least 1")]
    ZeroReplicas,

    #[error("at least one policy is required")]
    NoPolicies,

    #[error("policy list must be strictly decreasing in strictness: {later} follows {earlier}")]
    PolicyOrderViolation {
        earlier: PolicyKind,
        later: PolicyKind,
    },

    #[error("{policy} policy requires a non-empty {field}")]
    EmptyDirective {
        policy: PolicyKind,
        field: &'static str,
    },
}

/// One unit of non-deterministic work, plus the ordered agreement
/// policies that will be attempted against its replica outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Unique operation identifier. Reuse fails with a conflict.
    pub operation_id: String,

    /// Opaque work payload handed to the executor
    pub params: Value,

    /// Replicas to run for the replicated policy levels
    pub replica_count: usize,

    /// Policies to attempt, strictest first
    pub policies: Vec<PolicySpec>,
}

impl OperationRequest {
    pub fn new(
        operation_id: impl Into<String>,
        params: Value,
        replica_count: usize,
        policies: Vec<PolicySpec>,
    ) -> Self {
        OperationRequest {
            operation_id: operation_id.into(),
            params,
            replica_count,
            policies,
        }
    }

    /// Validate the request shape. Called by the orchestrator before any
    /// replica runs; a failure here never produces a ledger entry.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.operation_id.trim().is_empty() {
            return Err(RequestError::EmptyOperationId);
        }
        if self.replica_count == 0 {
            return Err(RequestError::ZeroReplicas);
        }
        if self.policies.is_empty() {
            return Err(RequestError::NoPolicies);
        }
        for spec in &self.policies {
            spec.validate()?;
        }
        for pair in self.policies.windows(2) {
            let earlier = pair[0].kind();
            let later = pair[1].kind();
            if later.strictness_rank() >= earlier.strictness_rank() {
                return Err(RequestError::PolicyOrderViolation { earlier, later });
            }
        }
        Ok(())
    }
}
