use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{Value, json};
use tower::ServiceExt;

use adapters::{ADMIN_PASSWORD_HEADER, AppState, InMemory, router};
use application::ports::in_::ExperimentService;
use domain::SimulationConfig;

fn app() -> Router {
    let store = Arc::new(InMemory::new());
    let experiment = Arc::new(ExperimentService::new(store.clone(), store, SimulationConfig::default()));
    router(Arc::new(AppState::new(experiment, Some("letmein".to_string()))))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .header("x-forwarded-for", "192.0.2.10, 10.0.0.1")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn survey() -> Value {
    json!({
        "age": 31,
        "experience": 5,
        "study_field": "Psychology",
        "gender": "female",
        "email": "someone@example.org"
    })
}

#[tokio::test]
async fn full_game_over_http() {
    let app = app();

    let (status, session) = send(&app, "POST", "/participants", Some(survey())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["group"], "control");
    assert_eq!(session["phase"]["state"], "in_progress");
    assert_eq!(session["phase"]["period"], 6);
    let id = session["participant_id"].as_str().unwrap().to_string();

    let (status, receipt) = send(
        &app,
        "POST",
        &format!("/participants/{id}/trades"),
        Some(json!({ "action": "buy", "stock": "Nimbus Health", "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["trade"]["period"], 6);
    assert!(receipt["persistence_warning"].is_null());

    for _ in 0..10 {
        let (status, _) = send(&app, "POST", &format!("/participants/{id}/advance"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, _) = send(&app, "POST", &format!("/participants/{id}/advance"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, session) = send(&app, "POST", &format!("/participants/{id}/conclude"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["phase"]["state"], "completed");

    let request = Request::builder()
        .uri("/admin/export")
        .header(ADMIN_PASSWORD_HEADER, "letmein")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let export: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(export["surveys"].as_array().unwrap().len(), 1);
    assert_eq!(export["surveys"][0]["source_ip"], "192.0.2.10");
    assert_eq!(export["actions"].as_array().unwrap().len(), 1);
    assert_eq!(export["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_trade_reports_reason() {
    let app = app();
    let (_, session) = send(&app, "POST", "/participants", Some(survey())).await;
    let id = session["participant_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/participants/{id}/trades"),
        Some(json!({ "action": "sell", "stock": "Nimbus Health", "quantity": 1 })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("insufficient holdings"));
}

#[tokio::test]
async fn oversized_quantity_is_rejected_not_dropped() {
    let app = app();
    let (_, session) = send(&app, "POST", "/participants", Some(survey())).await;
    let id = session["participant_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/participants/{id}/trades"),
        Some(json!({ "action": "buy", "stock": "Nimbus Health", "quantity": "79228162514264337593543950335" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("insufficient capital"));

    let (status, current) = send(&app, "GET", &format!("/participants/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(current["actions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_survey_is_rejected() {
    let app = app();
    let (status, _) = send(&app, "POST", "/participants", Some(json!({ "age": 4, "experience": 5 }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_participant_is_not_found() {
    let app = app();
    let (status, _) = send(&app, "GET", "/participants/NOPE00", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_export_requires_password() {
    let app = app();
    let (status, _) = send(&app, "GET", "/admin/export", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
