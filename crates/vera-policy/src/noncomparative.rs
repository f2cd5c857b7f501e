// NON-COMPARATIVE ASSESSMENT
// The most permissive level: a single candidate is judged against a task
// rubric. No replication, no cross-candidate comparison; replicas beyond
// the first are not even required to run.

use async_trait::async_trait;
use log::warn;

use vera_core::{CandidateResult, PolicyKind, PolicyOutcome};
use vera_oracle::JudgeHandle;

use crate::policy::AgreementPolicy;

pub struct NonComparativePolicy {
    task: String,
    criteria: String,
}

impl NonComparativePolicy {
    pub fn new(task: String, criteria: String) -> Self {
        NonComparativePolicy { task, criteria }
    }
}

#[async_trait]
impl AgreementPolicy for NonComparativePolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::NonComparative
    }

    fn replicas_needed(&self, _requested: usize) -> usize {
        1
    }

    fn min_successful(&self, _requested: usize) -> usize {
        1
    }

    async fn evaluate(&self, candidates: &[CandidateResult], judge: &JudgeHandle) -> PolicyOutcome {
        let Some(candidate) = candidates.iter().min_by_key(|c| c.replica_index) else {
            return PolicyOutcome::rejected("no candidate to assess");
        };

        match judge
            .assess(&candidate.value, &self.task, &self.criteria)
            .await
        {
            Ok(true) => PolicyOutcome::accepted(candidate.value.clone()),
            Ok(false) => PolicyOutcome::rejected(format!(
                "judge rejected the candidate against criteria `{}`",
                self.criteria
            )),
            Err(failure) => {
                warn!(
                    "non-comparative judge call failed, treating as rejection: {}",
                    failure
                );
                PolicyOutcome::rejected(format!("judge failure: {}", failure))
            }
        }
    }
}
