// EQUIVALENCE JUDGE BOUNDARY
// External semantic comparison service, standing in for human or
// model-graded validation. Potentially slow, potentially inconsistent
// across repeated calls with identical inputs.
//
// A judge failure is never fatal to an operation: the policy that issued
// the call treats it as a rejection and the orchestrator falls back.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum JudgeFailure {
    #[error("judge timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("judge unavailable: {0}")]
    Unavailable(String),

    #[error("malformed judge verdict: {0}")]
    MalformedVerdict(String),
}

/// Two entry points, one per judged policy level.
#[async_trait]
pub trait EquivalenceJudge: Send + Sync {
    /// Group equivalence of all candidates under a stated principle.
    async fn compare(&self, candidates: &[Value], principle: &str) -> Result<bool, JudgeFailure>;

    /// Quality assessment of a single candidate against a task rubric.
    async fn assess(
        &self,
        candidate: &Value,
        task: &str,
        criteria: &str,
    ) -> Result<bool, JudgeFailure>;
}
