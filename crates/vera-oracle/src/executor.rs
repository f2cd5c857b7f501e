// WORK EXECUTOR BOUNDARY
// The non-deterministic backend being verified. The engine treats it as a
// black box: same params may produce different values per invocation, and
// any invocation may be slow or fail outright.
//
// The executor performs no retries of its own. Retrying is the replica
// runner's concern.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// A single replica invocation failed. Recovered locally by the replica
/// runner (the replica is excluded from the candidate set) as long as the
/// policy's minimum replica count is still met.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkFailure {
    #[error("work timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("backend unavailable: {0}")]
    Backend(String),

    #[error("malformed output: {0}")]
    MalformedOutput(String),
}

/// One unit of non-deterministic work: `produce` is invoked once per
/// replica with the request's opaque params.
#[async_trait]
pub trait WorkExecutor: Send + Sync {
    async fn produce(&self, params: &Value) -> Result<Value, WorkFailure>;
}
