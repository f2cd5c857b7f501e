// SCRIPTED COLLABORATOR DOUBLES
// Deterministic replacements for the executor and the judge: they replay
// pre-programmed outputs and verdicts in order, so engine behavior can be
// exercised without any live backend. Used by the test suites and by the
// `vera` binary's scenario runner.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::executor::{WorkExecutor, WorkFailure};
use crate::judge::{EquivalenceJudge, JudgeFailure};

/// Executor that pops one scripted result per invocation. An exhausted
/// script behaves as a backend failure, which models an unavailable
/// replica rather than aborting the run.
pub struct ScriptedExecutor {
    script: Mutex<VecDeque<Result<Value, WorkFailure>>>,
    calls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new(script: Vec<Result<Value, WorkFailure>>) -> Self {
        ScriptedExecutor {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script of plain values, all succeeding.
    pub fn answering(values: Vec<Value>) -> Self {
        Self::new(values.into_iter().map(Ok).collect())
    }

    /// Total `produce` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Scripted results not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl WorkExecutor for ScriptedExecutor {
    async fn produce(&self, _params: &Value) -> Result<Value, WorkFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(WorkFailure::Backend("script exhausted".to_string())))
    }
}

/// Judge that pops scripted verdicts, one queue per entry point, and
/// counts invocations so tests can assert the judge was never consulted.
pub struct ScriptedJudge {
    comparisons: Mutex<VecDeque<Result<bool, JudgeFailure>>>,
    assessments: Mutex<VecDeque<Result<bool, JudgeFailure>>>,
    compare_calls: AtomicUsize,
    assess_calls: AtomicUsize,
}

impl ScriptedJudge {
    pub fn new(
        comparisons: Vec<Result<bool, JudgeFailure>>,
        assessments: Vec<Result<bool, JudgeFailure>>,
    ) -> Self {
        ScriptedJudge {
            comparisons: Mutex::new(comparisons.into()),
            assessments: Mutex::new(assessments.into()),
            compare_calls: AtomicUsize::new(0),
            assess_calls: AtomicUsize::new(0),
        }
    }

    /// Judge with plain boolean verdicts on both entry points.
    pub fn verdicts(comparisons: Vec<bool>, assessments: Vec<bool>) -> Self {
        Self::new(
            comparisons.into_iter().map(Ok).collect(),
            assessments.into_iter().map(Ok).collect(),
        )
    }

    /// Judge that must never be consulted.
    pub fn unconsulted() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn compare_calls(&self) -> usize {
        self.compare_calls.load(Ordering::SeqCst)
    }

    pub fn assess_calls(&self) -> usize {
        self.assess_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EquivalenceJudge for ScriptedJudge {
    async fn compare(&self, _candidates: &[Value], _principle: &str) -> Result<bool, JudgeFailure> {
        self.compare_calls.fetch_add(1, Ordering::SeqCst);
        self.comparisons
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(JudgeFailure::Unavailable("no scripted verdict".to_string())))
    }

    async fn assess(
        &self,
        _candidate: &Value,
        _task: &str,
        _criteria: &str,
    ) -> Result<bool, JudgeFailure> {
        self.assess_calls.fetch_add(1, Ordering::SeqCst);
        self.assessments
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(JudgeFailure::Unavailable("no scripted verdict".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_scripted_executor_replays_in_order() {
        let executor = ScriptedExecutor::answering(vec![json!("first"), json!("second")]);
        assert_eq!(executor.produce(&json!(null)).await, Ok(json!("first")));
        assert_eq!(executor.produce(&json!(null)).await, Ok(json!("second")));
        assert_eq!(executor.calls(), 2);
        assert_eq!(executor.remaining(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_script_fails_as_backend() {
        let executor = ScriptedExecutor::answering(vec![]);
        let result = executor.produce(&json!(null)).await;
        assert!(matches!(result, Err(WorkFailure::Backend(_))));
    }

    #[tokio::test]
    async fn test_scripted_judge_counts_calls() {
        let judge = ScriptedJudge::verdicts(vec![true], vec![false]);
        assert_eq!(judge.compare(&[json!("a")], "p").await, Ok(true));
        assert_eq!(judge.assess(&json!("a"), "t", "c").await, Ok(false));
        assert_eq!(judge.compare_calls(), 1);
        assert_eq!(judge.assess_calls(), 1);
    }
}
