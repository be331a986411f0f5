//! End-to-end round progression against a mocked hiring backend.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use interview_orchestrator::backend::{BackendClient, LoginRequest};
use interview_orchestrator::core::voice::InterviewSummary;
use interview_orchestrator::{
    AdvanceOutcome, MachinePhase, OverallStatus, Recommendation, RoundKind, RoundStateMachine,
    RoundStatus,
};

async fn backend() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-token",
            "user": {
                "id": "u1",
                "email": "ada@example.com",
                "full_name": "Ada Lovelace"
            }
        })))
        .mount(&server)
        .await;

    let client = BackendClient::new(server.uri(), 5).unwrap();
    client
        .login(&LoginRequest {
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    (server, client)
}

fn summary(total: f32) -> InterviewSummary {
    serde_json::from_value(json!({
        "session_id": "s1",
        "candidate_name": "Ada Lovelace",
        "job_role": "Backend Engineer",
        "scores": {
            "total_score": total,
            "average_score": total,
            "technical_avg": total,
            "behavioral_avg": total
        },
        "total_questions": 6,
        "conversation_log": [],
        "stage": "complete"
    }))
    .unwrap()
}

/// Answer every question of the active MCQ round, all-correct or all-wrong.
async fn play_round<R: interview_orchestrator::ScoreReporter>(
    machine: &mut RoundStateMachine<R>,
    round: RoundKind,
    all_correct: bool,
) -> interview_orchestrator::RoundOutcome {
    machine.enter(round).unwrap();
    loop {
        let question = machine.current_question().unwrap().clone();
        let option = if all_correct {
            question.correct_option_id.clone()
        } else {
            question
                .options
                .iter()
                .find(|c| c.id != question.correct_option_id)
                .unwrap()
                .id
                .clone()
        };
        machine.answer(&question.id, &option).unwrap();
        match machine.advance().await.unwrap() {
            AdvanceOutcome::NextQuestion => {}
            AdvanceOutcome::RoundSubmitted(outcome) => return outcome,
        }
    }
}

#[tokio::test]
async fn test_full_pipeline_pass_all_rounds() {
    let (server, client) = backend().await;

    Mock::given(method("POST"))
        .and(path("/quiz/submit"))
        .and(body_partial_json(json!({"total_questions": 5})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "score": 5,
            "passed": true
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/candidates/complete-round"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut machine = RoundStateMachine::new(&client, 5).with_seed(7);

    let first = play_round(&mut machine, RoundKind::Aptitude, true).await;
    assert!(first.passed);
    assert!(first.reported);

    let second = play_round(&mut machine, RoundKind::Dsa, true).await;
    assert!(second.passed);

    machine.enter(RoundKind::Voice).unwrap();
    let outcome = machine.complete_voice(&summary(82.0)).await.unwrap();
    assert!(outcome.reported);

    assert_eq!(machine.phase(), MachinePhase::Finished);
    assert_eq!(machine.attempt().overall_status, OverallStatus::Completed);
    assert_eq!(machine.attempt().round_1_score, Some(5));
    assert_eq!(machine.attempt().round_3_score, Some(82.0));

    // 100 + 100 + 82 over three rounds
    let overall = machine.attempt().overall_score(5).unwrap();
    assert!((overall - 94.0).abs() < 0.01);
    assert_eq!(Recommendation::from_score(overall), Recommendation::Hire);
}

#[tokio::test]
async fn test_failed_round_marks_rejected_but_pipeline_continues() {
    let (server, client) = backend().await;

    Mock::given(method("POST"))
        .and(path("/quiz/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "score": 0,
            "passed": false
        })))
        .mount(&server)
        .await;

    let mut machine = RoundStateMachine::new(&client, 5).with_seed(3);
    let outcome = play_round(&mut machine, RoundKind::Aptitude, false).await;

    assert!(!outcome.passed);
    assert_eq!(outcome.score.unwrap().correct, 0);
    assert_eq!(machine.attempt().overall_status, OverallStatus::Rejected);
    // The next round is still available after a failing score
    assert!(machine.is_enterable(RoundKind::Dsa));
}

#[tokio::test]
async fn test_backend_outage_does_not_block_progression() {
    let (server, client) = backend().await;

    Mock::given(method("POST"))
        .and(path("/quiz/submit"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let mut machine = RoundStateMachine::new(&client, 5).with_seed(11);
    let outcome = play_round(&mut machine, RoundKind::Aptitude, true).await;

    assert!(outcome.passed);
    assert!(!outcome.reported);
    assert_eq!(machine.attempt().status(RoundKind::Aptitude), RoundStatus::Passed);
    assert!(machine.is_enterable(RoundKind::Dsa));
}

#[tokio::test]
async fn test_round_order_is_enforced() {
    let (_server, client) = backend().await;
    let mut machine = RoundStateMachine::new(&client, 5).with_seed(1);

    assert!(machine.enter(RoundKind::Voice).is_err());
    assert!(machine.enter(RoundKind::Dsa).is_err());
    assert!(machine.enter(RoundKind::Aptitude).is_ok());
    // No nested rounds
    assert!(machine.enter(RoundKind::Aptitude).is_err());
}

#[tokio::test]
async fn test_reattempt_after_full_pipeline() {
    let (server, client) = backend().await;

    Mock::given(method("POST"))
        .and(path("/quiz/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "score": 5,
            "passed": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/candidates/complete-round"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let mut machine = RoundStateMachine::new(&client, 5).with_seed(5);
    play_round(&mut machine, RoundKind::Aptitude, true).await;
    play_round(&mut machine, RoundKind::Dsa, true).await;
    machine.enter(RoundKind::Voice).unwrap();
    machine.complete_voice(&summary(64.0)).await.unwrap();

    machine.grant_reattempt().unwrap();

    assert_eq!(machine.attempt().number, 2);
    assert_eq!(machine.phase(), MachinePhase::Selecting);
    assert!(machine.is_enterable(RoundKind::Aptitude));
    assert!(!machine.is_enterable(RoundKind::Dsa));

    let archived = machine.archived_attempts();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].round_3_score, Some(64.0));
    assert_eq!(archived[0].overall_status, OverallStatus::Completed);
    assert_eq!(
        archived[0].recommendation,
        Some(Recommendation::Hire)
    );
}
