// AGREEMENT POLICY TRAIT
// Unified interface for all agreement levels. Policies are state-free:
// every evaluation receives the full candidate set and the judge handle
// explicitly, so an evaluation is reproducible from its inputs alone.
//
// SAFETY INVARIANTS:
// 1. Rejection is a normal outcome, never an exception
// 2. A judge failure rejects the current policy, it does not abort the
//    operation
// 3. Policies declare their own replica requirements; the orchestrator
//    never guesses

use async_trait::async_trait;

use vera_core::{CandidateResult, PolicyKind, PolicyOutcome, PolicySpec};
use vera_oracle::JudgeHandle;

use crate::comparative::ComparativePolicy;
use crate::noncomparative::NonComparativePolicy;
use crate::strict::StrictPolicy;

#[async_trait]
pub trait AgreementPolicy: Send + Sync {
    /// The level this policy implements.
    fn kind(&self) -> PolicyKind;

    /// Replicas this policy wants run, given the request's replica count.
    /// The non-comparative level consumes a single candidate, so it asks
    /// for one replica regardless of the request.
    fn replicas_needed(&self, requested: usize) -> usize;

    /// Minimum successful replicas required before evaluation makes
    /// sense. Below this, the runner reports a run failure and the
    /// orchestrator treats the attempt as rejected.
    fn min_successful(&self, requested: usize) -> usize;

    /// Decide whether the candidate set is acceptable under this policy.
    ///
    /// Candidates arrive ordered by replica index. The outcome carries
    /// the canonical value iff accepted, and rejection diagnostics
    /// otherwise.
    async fn evaluate(&self, candidates: &[CandidateResult], judge: &JudgeHandle) -> PolicyOutcome;
}

/// Build the policy implementation for a spec.
pub fn build_policy(spec: &PolicySpec) -> Box<dyn AgreementPolicy> {
    match spec {
        PolicySpec::Strict => Box::new(StrictPolicy),
        PolicySpec::Comparative { principle } => {
            Box::new(ComparativePolicy::new(principle.clone()))
        }
        PolicySpec::NonComparative { task, criteria } => {
            Box::new(NonComparativePolicy::new(task.clone(), criteria.clone()))
        }
    }
}
