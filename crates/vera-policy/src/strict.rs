// STRICT AGREEMENT
// All replica outputs must share one canonical form. Zero semantic
// tolerance; the judge is never consulted.

use async_trait::async_trait;

use vera_core::normalize::{canonical_form, canonical_value};
use vera_core::{CandidateResult, PolicyKind, PolicyOutcome};
use vera_oracle::JudgeHandle;

use crate::policy::AgreementPolicy;

pub struct StrictPolicy;

#[async_trait]
impl AgreementPolicy for StrictPolicy {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Strict
    }

    fn replicas_needed(&self, requested: usize) -> usize {
        requested
    }

    fn min_successful(&self, requested: usize) -> usize {
        requested
    }

    async fn evaluate(
        &self,
        candidates: &[CandidateResult],
        _judge: &JudgeHandle,
    ) -> PolicyOutcome {
        let Some(first) = candidates.first() else {
            return PolicyOutcome::rejected("no candidates to evaluate");
        };

        let mut distinct: Vec<String> = Vec::new();
        for candidate in candidates {
            let form = canonical_form(&candidate.value);
            if !distinct.contains(&form) {
                distinct.push(form);
            }
        }

        if distinct.len() == 1 {
            // The common value, in canonical form
            PolicyOutcome::accepted(canonical_value(&first.value))
        } else {
            PolicyOutcome::rejected(format!(
                "candidates disagree, {} distinct values seen: [{}]",
                distinct.len(),
                distinct.join(", ")
            ))
        }
    }
}
