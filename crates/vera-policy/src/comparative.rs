// COMPARATIVE AGREEMENT
// Replica outputs must be judged equivalent under a stated principle.
// The judge call is itself non-deterministic; this policy does not retry
// it. A judge failure rejects this policy and the orchestrator falls
// back.

use async_trait::async_trait;
use log::warn;
use serde_json::Value;

use vera_core::{CandidateResult, PolicyKind, PolicyOutcome};
use vera_oracle::JudgeHandle;

use crate::policy::AgreementPolicy;

pub struct ComparativePolicy {
    /// Opaque comparison directive handed to the judge
    principle: String,
}

impl ComparativePolicy {
    pub fn new(principle: String) -> Self {
        ComparativePolicy { principle }
    }
}

#[async_trait]
impl AgreementPolicy for ComparativePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Comparative
    }

    fn replicas_needed(&self, requested: usize) -> usize {
        requested
    }

    fn min_successful(&self, requested: usize) -> usize {
        requested
    }

    async fn evaluate(&self, candidates: &[CandidateResult], judge: &JudgeHandle) -> PolicyOutcome {
        let mut ordered: Vec<&CandidateResult> = candidates.iter().collect();
        ordered.sort_by_key(|candidate| candidate.replica_index);

        let Some(first) = ordered.first() else {
            return PolicyOutcome::rejected("no candidates to evaluate");
        };

        let values: Vec<Value> = ordered
            .iter()
            .map(|candidate| candidate.value.clone())
            .collect();

        match judge.compare(&values, &self.principle).await {
            Ok(true) => PolicyOutcome::accepted(first.value.clone()),
            Ok(false) => PolicyOutcome::rejected(format!(
                "judge found candidates non-equivalent under principle `{}`",
                self.principle
            )),
            Err(failure) => {
                warn!(
                    "comparative judge call failed, treating as rejection: {}",
                    failure
                );
                PolicyOutcome::rejected(format!("judge failure: {}", failure))
            }
        }
    }
}
