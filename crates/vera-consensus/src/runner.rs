// REPLICA RUNNER
// Executes the work unit independently across replicas and collects the
// candidate set. Replica executions are concurrent and unordered; each
// one is bounded by the replica deadline.
//
// Partial failures are tolerated while the policy's minimum is met:
// failed replicas are excluded from the candidate set and kept as
// diagnostics. Below the minimum, the whole run fails and the
// orchestrator treats it as a rejection of the current policy.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};
use serde_json::Value;

use vera_core::CandidateResult;
use vera_oracle::{produce_bounded, WorkExecutor, WorkFailure};

/// One replica that failed to produce a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaFault {
    pub replica_index: usize,
    pub failure: WorkFailure,
}

impl fmt::Display for ReplicaFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "replica {}: {}", self.replica_index, self.failure)
    }
}

/// Outcome of one replica batch: the candidates that succeeded, plus
/// diagnostics for the replicas that did not.
#[derive(Debug)]
pub struct ReplicaBatch {
    pub candidates: Vec<CandidateResult>,
    pub faults: Vec<ReplicaFault>,
}

/// Too few replicas succeeded to evaluate the current policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RunFailure {
    pub succeeded: usize,
    pub required: usize,
    pub faults: Vec<ReplicaFault>,
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faults: Vec<String> = self.faults.iter().map(|fault| fault.to_string()).collect();
        write!(
            f,
            "only {} of {} required replicas succeeded: [{}]",
            self.succeeded,
            self.required,
            faults.join("; ")
        )
    }
}

impl std::error::Error for RunFailure {}

pub struct ReplicaRunner {
    deadline: Duration,
}

impl ReplicaRunner {
    pub fn new(deadline: Duration) -> Self {
        ReplicaRunner { deadline }
    }

    /// Run `replicas` independent executions and keep the ones that
    /// produced a value. Candidates come back ordered by replica index.
    pub async fn run(
        &self,
        executor: &Arc<dyn WorkExecutor>,
        params: &Value,
        replicas: usize,
        min_successful: usize,
    ) -> Result<ReplicaBatch, RunFailure> {
        let executions = (0..replicas).map(|replica_index| {
            let executor = Arc::clone(executor);
            let deadline = self.deadline;
            async move {
                let result = produce_bounded(executor.as_ref(), params, deadline).await;
                (replica_index, result)
            }
        });

        let mut candidates = Vec::new();
        let mut faults = Vec::new();
        for (replica_index, result) in join_all(executions).await {
            match result {
                Ok(value) => candidates.push(CandidateResult::new(replica_index, value)),
                Err(failure) => {
                    debug!("replica {} failed: {}", replica_index, failure);
                    faults.push(ReplicaFault {
                        replica_index,
                        failure,
                    });
                }
            }
        }

        if candidates.len() < min_successful {
            return Err(RunFailure {
                succeeded: candidates.len(),
                required: min_successful,
                faults,
            });
        }

        if !faults.is_empty() {
            warn!(
                "{} of {} replicas failed, continuing with {} candidates",
                faults.len(),
                replicas,
                candidates.len()
            );
        }

        Ok(ReplicaBatch { candidates, faults })
    }
}
