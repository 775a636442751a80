//! HTTP API tests: menu, session lifecycle and round play through the router.

use axum::http::StatusCode;
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use rosco_backend::config::AppConfig;
use rosco_backend::domain::{ClueType, GameSet, QuestionRecord};
use rosco_backend::routes::build_router;
use rosco_backend::state::AppState;

fn two_letter_game() -> GameSet {
    GameSet::new("ab", "Rosco AB", vec![
        QuestionRecord::new('B', ClueType::StartsWith, "Prócer de la bandera", "Belgrano"),
        QuestionRecord::new('A', ClueType::StartsWith, "Capital de Argentina", "Buenos Aires"),
    ])
}

fn server() -> TestServer {
    let state = AppState::with_catalog(AppConfig::default(), vec![two_letter_game()]);
    TestServer::new(build_router(state)).unwrap()
}

async fn new_started_session(server: &TestServer) -> String {
    let created: Value = server.post("/api/v1/sessions").json(&json!({ "gameId": "ab" })).await.json();
    let id = created["sessionId"].as_str().unwrap().to_string();
    server.post(&format!("/api/v1/sessions/{id}/start")).await.assert_status_ok();
    id
}

#[tokio::test]
async fn health_and_menu() {
    let server = server();
    server.get("/api/v1/health").await.assert_status_ok();

    let menu: Value = server.get("/api/v1/games").await.json();
    assert_eq!(menu, json!([{ "id": "ab", "title": "Rosco AB", "questionCount": 2 }]));
}

#[tokio::test]
async fn new_session_starts_in_intro() {
    let server = server();
    let response = server.post("/api/v1/sessions").json(&json!({ "gameId": "ab" })).await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(view["phase"], "intro");
    assert_eq!(view["timeRemaining"], 300);
    assert_eq!(view["total"], 2);
    assert!(view.get("currentLetter").is_none());
    assert_eq!(view["statuses"], json!([
        { "letter": "A", "status": "unanswered" },
        { "letter": "B", "status": "unanswered" },
    ]));
}

#[tokio::test]
async fn unknown_game_and_session_are_404() {
    let server = server();
    server
        .post("/api/v1/sessions")
        .json(&json!({ "gameId": "missing" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/v1/sessions/6f1c2a0e-8a55-4d2a-9d59-0b1b2d2f3c4d")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn actions_before_start_conflict() {
    let server = server();
    let created: Value = server.post("/api/v1/sessions").json(&json!({ "gameId": "ab" })).await.json();
    let id = created["sessionId"].as_str().unwrap();

    let response = server.post(&format!("/api/v1/sessions/{id}/pass")).await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"], "conflict");

    server.post(&format!("/api/v1/sessions/{id}/start")).await.assert_status_ok();
    server
        .post(&format!("/api/v1/sessions/{id}/start"))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn answer_then_pass_returns_to_passed_letter() {
    let server = server();
    let id = new_started_session(&server).await;

    let answered: Value = server
        .post(&format!("/api/v1/sessions/{id}/answer"))
        .json(&json!({ "answer": "buenos aires" }))
        .await
        .json();
    assert_eq!(answered["letter"], "A");
    assert_eq!(answered["correct"], true);
    assert_eq!(answered["cue"], "ok");
    assert_eq!(answered["cueUrl"], "/Rosco/ok.wav");
    assert_eq!(answered["round"]["currentLetter"], "B");

    let passed: Value = server.post(&format!("/api/v1/sessions/{id}/pass")).await.json();
    assert_eq!(passed["phase"], "playing");
    assert_eq!(passed["currentLetter"], "B");
    assert_eq!(passed["clueType"], "Empieza");
    assert_eq!(passed["definition"], "Prócer de la bandera");
}

#[tokio::test]
async fn judging_every_letter_finishes_round() {
    let server = server();
    let id = new_started_session(&server).await;

    for answer in ["Buenos Aires", "San Martín"] {
        server
            .post(&format!("/api/v1/sessions/{id}/answer"))
            .json(&json!({ "answer": answer }))
            .await
            .assert_status_ok();
    }

    let view: Value = server.get(&format!("/api/v1/sessions/{id}")).await.json();
    assert_eq!(view["phase"], "finished");
    assert_eq!(view["score"], 1);
    assert_eq!(view["celebrate"], false);
    assert_eq!(view["statuses"][1], json!({ "letter": "B", "status": "incorrect" }));

    server
        .post(&format!("/api/v1/sessions/{id}/answer"))
        .json(&json!({ "answer": "Belgrano" }))
        .await
        .assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn leave_tears_session_down() {
    let server = server();
    let id = new_started_session(&server).await;

    let left: Value = server.delete(&format!("/api/v1/sessions/{id}")).await.json();
    assert_eq!(left["phase"], "playing");

    server
        .get(&format!("/api/v1/sessions/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/api/v1/sessions/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
