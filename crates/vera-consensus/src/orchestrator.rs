// GRADUATED FALLBACK ORCHESTRATOR
// Tries agreement policies in order of decreasing strictness and returns
// the first accepted result, recording which level succeeded.
//
// SAFETY INVARIANTS:
// 1. Policy attempts are sequential; attempt N+1 never starts before
//    attempt N's evaluation completes
// 2. A completed operation id is never re-executed
// 3. Exactly one ledger entry per completed operation, written at the
//    terminal transition
// 4. Expected failures (work, judge, run) fuel the fallback; request
//    configuration errors are fatal and precede any replica run
// 5. Cancellation (dropping the execute future) abandons in-flight work
//    and writes no ledger entry

use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use vera_core::{AttemptRecord, OperationRequest, PolicyKind, RequestError};
use vera_ledger::{LedgerEntry, LedgerError, ResultLedger};
use vera_oracle::{EquivalenceJudge, JudgeHandle, WorkExecutor};
use vera_policy::build_policy;

use crate::config::EngineConfig;
use crate::runner::ReplicaRunner;

/// Lifecycle of one operation inside the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    Evaluating(PolicyKind),
    Accepted,
    Exhausted,
}

/// The accepted result of an operation: the canonical value, the policy
/// level that produced it, and the rejection history of the stricter
/// levels tried first.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedOutcome {
    pub operation_id: String,
    pub value: Value,
    pub policy: PolicyKind,
    pub replicas_run: usize,
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    #[error("operation `{operation_id}` already completed")]
    OperationConflict { operation_id: String },

    #[error("every configured policy rejected operation `{operation_id}`")]
    AllPoliciesExhausted {
        operation_id: String,
        attempts: Vec<AttemptRecord>,
    },

    #[error("ledger error: {0}")]
    Ledger(LedgerError),
}

pub struct FallbackOrchestrator {
    runner: ReplicaRunner,
    judge: JudgeHandle,
    ledger: Arc<ResultLedger>,
}

impl FallbackOrchestrator {
    pub fn new(
        judge: Arc<dyn EquivalenceJudge>,
        ledger: Arc<ResultLedger>,
        config: EngineConfig,
    ) -> Self {
        FallbackOrchestrator {
            runner: ReplicaRunner::new(config.replica_deadline),
            judge: JudgeHandle::new(judge, config.judge_deadline),
            ledger,
        }
    }

    pub fn ledger(&self) -> &Arc<ResultLedger> {
        &self.ledger
    }

    /// Execute one operation to a terminal outcome.
    ///
    /// Exactly three things can come back: an accepted value with the
    /// policy level that produced it, `AllPoliciesExhausted` with the
    /// full rejection history, or `OperationConflict` for a reused id.
    pub async fn execute(
        &self,
        request: OperationRequest,
        executor: Arc<dyn WorkExecutor>,
    ) -> Result<AcceptedOutcome, EngineError> {
        request.validate()?;

        // Completed ids are final: fail fast, no work re-executed.
        if self.ledger.contains(&request.operation_id) {
            return Err(EngineError::OperationConflict {
                operation_id: request.operation_id,
            });
        }

        if request.replica_count == 1
            && request.policies.first().map(|spec| spec.kind()) == Some(PolicyKind::Strict)
        {
            warn!(
                "operation `{}`: a single replica under strict policy trivially self-agrees \
                 and provides no consistency guarantee",
                request.operation_id
            );
        }

        let mut state = OperationState::Pending;
        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut replicas_run = 0usize;
        debug!(
            "operation `{}` state: {:?} with {} policies",
            request.operation_id,
            state,
            request.policies.len()
        );

        for spec in &request.policies {
            let policy = build_policy(spec);
            state = OperationState::Evaluating(policy.kind());
            debug!("operation `{}` state: {:?}", request.operation_id, state);

            let needed = policy.replicas_needed(request.replica_count);
            let minimum = policy.min_successful(request.replica_count);
            replicas_run += needed;

            let batch = match self
                .runner
                .run(&executor, &request.params, needed, minimum)
                .await
            {
                Ok(batch) => batch,
                Err(failure) => {
                    warn!(
                        "operation `{}`: {} level run failed: {}",
                        request.operation_id,
                        policy.kind(),
                        failure
                    );
                    attempts.push(AttemptRecord {
                        policy: policy.kind(),
                        replicas_requested: needed,
                        replicas_succeeded: failure.succeeded,
                        detail: failure.to_string(),
                    });
                    continue;
                }
            };

            let outcome = policy.evaluate(&batch.candidates, &self.judge).await;
            match outcome.canonical {
                Some(value) if outcome.accepted => {
                    state = OperationState::Accepted;
                    info!(
                        "operation `{}` accepted at {} level after {} rejections",
                        request.operation_id,
                        policy.kind(),
                        attempts.len()
                    );
                    let entry = LedgerEntry::accepted(
                        request.operation_id.clone(),
                        value.clone(),
                        policy.kind(),
                        replicas_run,
                        attempts.clone(),
                    );
                    self.record(entry)?;
                    debug!("operation `{}` state: {:?}", request.operation_id, state);
                    return Ok(AcceptedOutcome {
                        operation_id: request.operation_id,
                        value,
                        policy: policy.kind(),
                        replicas_run,
                        attempts,
                    });
                }
                _ => {
                    debug!(
                        "operation `{}`: {} level rejected: {}",
                        request.operation_id,
                        policy.kind(),
                        outcome.detail
                    );
                    attempts.push(AttemptRecord {
                        policy: policy.kind(),
                        replicas_requested: needed,
                        replicas_succeeded: batch.candidates.len(),
                        detail: outcome.detail,
                    });
                }
            }
        }

        state = OperationState::Exhausted;
        error!(
            "operation `{}` exhausted all {} policies",
            request.operation_id,
            attempts.len()
        );
        debug!("operation `{}` state: {:?}", request.operation_id, state);
        let entry = LedgerEntry::exhausted(
            request.operation_id.clone(),
            replicas_run,
            attempts.clone(),
        );
        self.record(entry)?;
        Err(EngineError::AllPoliciesExhausted {
            operation_id: request.operation_id,
            attempts,
        })
    }

    // A racing writer for the same id loses here and surfaces as a
    // conflict, same as the fast-path check.
    fn record(&self, entry: LedgerEntry) -> Result<(), EngineError> {
        self.ledger.record(entry).map_err(|err| match err {
            LedgerError::OperationConflict { operation_id } => {
                EngineError::OperationConflict { operation_id }
            }
            other => EngineError::Ledger(other),
        })
    }
}
