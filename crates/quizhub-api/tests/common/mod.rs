//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use quizhub_broadcast::HubRegistry;
use quizhub_core::identity::Identity;
use quizhub_session::SessionOrchestrator;
use quizhub_store::InMemoryStore;
use quizhub_test_support::{FixedClock, MockRng, quiz_fixture};
use tower::ServiceExt;

use quizhub_api::identity::{USER_EMAIL_HEADER, USER_NAME_HEADER};
use quizhub_api::state::AppState;

/// Public quiz with three questions.
pub const PUBLIC_QUIZ: u64 = 1;

/// Private quiz only the fixture quiz master collaborates on.
pub const PRIVATE_QUIZ: u64 = 2;

/// Build the full app router over an in-memory store seeded with
/// [`PUBLIC_QUIZ`] and [`PRIVATE_QUIZ`]. Session codes start at 10000.
pub async fn build_test_app() -> Router {
    let store = InMemoryStore::new();
    let (quiz, questions) = quiz_fixture(PUBLIC_QUIZ, 3);
    store.insert_quiz(quiz, questions).await;
    let (mut quiz, questions) = quiz_fixture(PRIVATE_QUIZ, 1);
    quiz.private = true;
    store.insert_quiz(quiz, questions).await;

    let orchestrator = SessionOrchestrator::new(
        Arc::new(store),
        Arc::new(HubRegistry::default()),
        Arc::new(FixedClock::default()),
        Box::new(MockRng),
    );
    quizhub_api::app(AppState::new(Arc::new(orchestrator)))
}

/// Send a request as `caller` (or anonymously) and return the status and
/// JSON body. An empty body comes back as `Value::Null`.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    caller: Option<&Identity>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder
            .header(USER_EMAIL_HEADER, &caller.email)
            .header(USER_NAME_HEADER, &caller.display_name);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// POST without a body.
pub async fn post(app: &Router, uri: &str, caller: &Identity) -> StatusCode {
    send(app, "POST", uri, Some(caller), None).await.0
}

/// POST a JSON body.
pub async fn post_json(
    app: &Router,
    uri: &str,
    caller: &Identity,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(caller), Some(body)).await
}

/// GET anonymously.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None, None).await
}
