// DEADLINE GUARDS
// Every call that leaves the engine is bounded by a deadline. An elapsed
// deadline surfaces as an explicit failure, never a silent hang.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::timeout;

use crate::executor::{WorkExecutor, WorkFailure};
use crate::judge::{EquivalenceJudge, JudgeFailure};

/// Invoke the executor under a deadline.
pub async fn produce_bounded(
    executor: &dyn WorkExecutor,
    params: &Value,
    deadline: Duration,
) -> Result<Value, WorkFailure> {
    match timeout(deadline, executor.produce(params)).await {
        Ok(result) => result,
        Err(_) => Err(WorkFailure::Timeout {
            elapsed_ms: deadline.as_millis() as u64,
        }),
    }
}

/// A judge coupled with its deadline. Policies receive this handle rather
/// than the raw trait object, so no unbounded judge call can be issued.
#[derive(Clone)]
pub struct JudgeHandle {
    judge: Arc<dyn EquivalenceJudge>,
    deadline: Duration,
}

impl JudgeHandle {
    pub fn new(judge: Arc<dyn EquivalenceJudge>, deadline: Duration) -> Self {
        JudgeHandle { judge, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn compare(
        &self,
        candidates: &[Value],
        principle: &str,
    ) -> Result<bool, JudgeFailure> {
        match timeout(self.deadline, self.judge.compare(candidates, principle)).await {
            Ok(verdict) => verdict,
            Err(_) => Err(JudgeFailure::Timeout {
                elapsed_ms: self.deadline.as_millis() as u64,
            }),
        }
    }

    pub async fn assess(
        &self,
        candidate: &Value,
        task: &str,
        criteria: &str,
    ) -> Result<bool, JudgeFailure> {
        match timeout(self.deadline, self.judge.assess(candidate, task, criteria)).await {
            Ok(verdict) => verdict,
            Err(_) => Err(JudgeFailure::Timeout {
                elapsed_ms: self.deadline.as_millis() as u64,
            }),
        }
    }
}
