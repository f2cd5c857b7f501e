// END-TO-END GRADUATED FALLBACK TESTS
// Exercises the full ladder against scripted collaborators: strict
// acceptance without judge involvement, comparative fallback, quality
// fallback, exhaustion, and conflict semantics.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use vera_consensus::{EngineConfig, EngineError, FallbackOrchestrator};
use vera_core::{OperationRequest, PolicyKind, PolicySpec};
use vera_ledger::{ResultLedger, Verdict};
use vera_oracle::{JudgeFailure, ScriptedExecutor, ScriptedJudge, WorkExecutor};

fn config() -> EngineConfig {
    EngineConfig {
        replica_deadline: Duration::from_secs(1),
        judge_deadline: Duration::from_secs(1),
    }
}

fn full_ladder() -> Vec<PolicySpec> {
    vec![
        PolicySpec::Strict,
        PolicySpec::Comparative {
            principle: "same directional meaning".to_string(),
        },
        PolicySpec::NonComparative {
            task: "report price direction".to_string(),
            criteria: "states a clear direction".to_string(),
        },
    ]
}

fn request(id: &str) -> OperationRequest {
    OperationRequest::new(id, json!({"query": "did the price go up?"}), 3, full_ladder())
}

fn orchestrator(judge: Arc<ScriptedJudge>) -> FallbackOrchestrator {
    FallbackOrchestrator::new(judge, Arc::new(ResultLedger::new()), config())
}

#[tokio::test]
async fn test_strict_acceptance_never_consults_judge() {
    // Spec scenario: replicas answer "42", "42", "42.0"; numeric
    // normalization makes them agree, the judge is never called.
    let executor = Arc::new(ScriptedExecutor::answering(vec![
        json!("42"),
        json!("42"),
        json!("42.0"),
    ]));
    let judge = Arc::new(ScriptedJudge::unconsulted());
    let engine = orchestrator(judge.clone());

    let outcome = engine
        .execute(request("op-1"), executor as Arc<dyn WorkExecutor>)
        .await
        .unwrap();

    assert_eq!(outcome.policy, PolicyKind::Strict);
    assert_eq!(outcome.value, json!(42));
    assert!(outcome.attempts.is_empty());
    assert_eq!(judge.compare_calls(), 0);
    assert_eq!(judge.assess_calls(), 0);
}

#[tokio::test]
async fn test_comparative_fallback_uses_first_replica_as_canonical() {
    // Spec scenario: strict disagrees, the judge approves equivalence
    // under "same directional meaning", the first replica's raw value
    // becomes canonical.
    let executor = Arc::new(ScriptedExecutor::answering(vec![
        // strict attempt
        json!("yes, the price is up"),
        json!("price increased"),
        json!("it went up"),
        // comparative attempt
        json!("yes, the price is up"),
        json!("price increased"),
        json!("it went up"),
    ]));
    let judge = Arc::new(ScriptedJudge::verdicts(vec![true], vec![]));
    let engine = orchestrator(judge.clone());

    let outcome = engine
        .execute(request("op-1"), executor as Arc<dyn WorkExecutor>)
        .await
        .unwrap();

    assert_eq!(outcome.policy, PolicyKind::Comparative);
    assert_eq!(outcome.value, json!("yes, the price is up"));
    assert_eq!(outcome.attempts.len(), 1);
    assert_eq!(outcome.attempts[0].policy, PolicyKind::Strict);
    assert_eq!(judge.compare_calls(), 1);
    assert_eq!(judge.assess_calls(), 0);
}

#[tokio::test]
async fn test_noncomparative_fallback_runs_one_replica() {
    let executor = Arc::new(ScriptedExecutor::answering(vec![
        // strict attempt, three replicas
        json!("up"),
        json!("down"),
        json!("sideways"),
        // comparative attempt, three replicas
        json!("up"),
        json!("down"),
        json!("sideways"),
        // non-comparative attempt, a single replica
        json!("price went up"),
    ]));
    let judge = Arc::new(ScriptedJudge::verdicts(vec![false], vec![true]));
    let engine = orchestrator(judge.clone());

    let outcome = engine
        .execute(request("op-1"), executor.clone() as Arc<dyn WorkExecutor>)
        .await
        .unwrap();

    assert_eq!(outcome.policy, PolicyKind::NonComparative);
    assert_eq!(outcome.value, json!("price went up"));
    assert_eq!(outcome.attempts.len(), 2);
    // 3 strict + 3 comparative + 1 non-comparative
    assert_eq!(executor.calls(), 7);
    assert_eq!(outcome.replicas_run, 7);
}

#[tokio::test]
async fn test_exhaustion_records_one_attempt_per_policy_in_order() {
    let executor = Arc::new(ScriptedExecutor::answering(vec![
        json!("up"),
        json!("down"),
        json!("sideways"),
        json!("up"),
        json!("down"),
        json!("sideways"),
        json!("no idea"),
    ]));
    let judge = Arc::new(ScriptedJudge::new(
        vec![Err(JudgeFailure::Unavailable("judge offline".to_string()))],
        vec![Ok(false)],
    ));
    let engine = orchestrator(judge);

    let err = engine
        .execute(request("op-1"), executor as Arc<dyn WorkExecutor>)
        .await
        .unwrap_err();

    let EngineError::AllPoliciesExhausted {
        operation_id,
        attempts,
    } = err
    else {
        panic!("expected exhaustion");
    };
    assert_eq!(operation_id, "op-1");
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts[0].policy, PolicyKind::Strict);
    assert_eq!(attempts[1].policy, PolicyKind::Comparative);
    assert_eq!(attempts[2].policy, PolicyKind::NonComparative);
    assert!(attempts[0].detail.contains("distinct values"));
    assert!(attempts[1].detail.contains("judge failure"));

    // The terminal failure is on the ledger too
    let entry = engine.ledger().lookup("op-1").unwrap();
    assert_eq!(entry.verdict, Verdict::Exhausted);
    assert_eq!(entry.attempts.len(), 3);
}

#[tokio::test]
async fn test_accepted_entry_lands_on_ledger_with_policy_level() {
    let executor = Arc::new(ScriptedExecutor::answering(vec![
        json!("42"),
        json!("42"),
        json!("42"),
    ]));
    let judge = Arc::new(ScriptedJudge::unconsulted());
    let engine = orchestrator(judge);

    engine
        .execute(request("op-1"), executor as Arc<dyn WorkExecutor>)
        .await
        .unwrap();

    let entry = engine.ledger().lookup("op-1").unwrap();
    let Verdict::Accepted { value, policy, .. } = &entry.verdict else {
        panic!("expected accepted verdict");
    };
    assert_eq!(value, &json!(42));
    assert_eq!(*policy, PolicyKind::Strict);
    assert_eq!(entry.replicas_run, 3);
}

#[tokio::test]
async fn test_resubmission_conflicts_for_accepted_and_exhausted_ids() {
    let judge = Arc::new(ScriptedJudge::new(
        vec![
            Err(JudgeFailure::Unavailable("offline".to_string())),
        ],
        vec![Ok(false)],
    ));
    let engine = orchestrator(judge);

    // Exhaust op-fail
    let failing = Arc::new(ScriptedExecutor::answering(vec![
        json!("a"),
        json!("b"),
        json!("c"),
        json!("a"),
        json!("b"),
        json!("c"),
        json!("a"),
    ]));
    let _ = engine
        .execute(request("op-fail"), failing as Arc<dyn WorkExecutor>)
        .await
        .unwrap_err();

    // Accept op-ok
    let passing = Arc::new(ScriptedExecutor::answering(vec![
        json!("42"),
        json!("42"),
        json!("42"),
    ]));
    engine
        .execute(request("op-ok"), passing as Arc<dyn WorkExecutor>)
        .await
        .unwrap();

    // Both ids now conflict, and neither resubmission runs any work
    for id in ["op-fail", "op-ok"] {
        let probe = Arc::new(ScriptedExecutor::answering(vec![json!("x")]));
        let err = engine
            .execute(request(id), probe.clone() as Arc<dyn WorkExecutor>)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::OperationConflict { .. }));
        assert_eq!(probe.calls(), 0);
    }
}

#[tokio::test]
async fn test_repeated_lookup_is_byte_identical() {
    let executor = Arc::new(ScriptedExecutor::answering(vec![
        json!("42"),
        json!("42"),
        json!("42"),
    ]));
    let judge = Arc::new(ScriptedJudge::unconsulted());
    let engine = orchestrator(judge);

    engine
        .execute(request("op-1"), executor as Arc<dyn WorkExecutor>)
        .await
        .unwrap();

    let first = serde_json::to_vec(&engine.ledger().lookup("op-1").unwrap()).unwrap();
    let second = serde_json::to_vec(&engine.ledger().lookup("op-1").unwrap()).unwrap();
    assert_eq!(first, second);
}
