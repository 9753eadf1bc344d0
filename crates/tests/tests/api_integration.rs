use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Days, Months, Utc};
use safenest_agents::CompanionAgent;
use safenest_api::rate_limit::ClientRateLimiter;
use safenest_api::{build_router, ApiState};
use safenest_core::{candidates, SentimentLabel};
use safenest_observability::AppMetrics;
use safenest_storage::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

const API_KEY: &str = "test-safenest-key";

fn test_app() -> Router {
    let metrics = AppMetrics::shared();
    let agent = Arc::new(CompanionAgent::with_typing_delay(
        Arc::new(MemoryStore::new()),
        metrics.clone(),
        Duration::ZERO,
    ));

    build_router(ApiState {
        agent,
        metrics,
        api_key: API_KEY.to_string(),
        limiter: ClientRateLimiter::new(Duration::from_secs(60), 1000),
    })
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", API_KEY)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-api-key", API_KEY)
        .body(Body::empty())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn birth_date_for_age(years: u32) -> String {
    let date = Utc::now().date_naive() - Months::new(12 * years) - Days::new(30);
    date.to_string()
}

async fn login(app: &Router, name: &str) -> String {
    let response = app
        .clone()
        .oneshot(post(
            "/v1/auth/login",
            json!({ "name": name, "password": "anything" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    json_body(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload = json_body(response).await;
    assert_eq!(payload["status"], "ok");
    assert!(payload["metrics"]["messages_total"].is_number());
}

#[tokio::test]
async fn chat_requires_api_key() {
    let app = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "session_id": "any", "text": "hello" }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_chat_logout_flow() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post(
            "/v1/auth/register",
            json!({
                "name": "Mira",
                "password": "sunflower",
                "confirm_password": "sunflower",
                "birth_date": birth_date_for_age(10)
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let handle = json_body(response).await;
    assert_eq!(handle["age"], 10);
    assert_eq!(handle["greeting"]["sentiment"], "positive");
    let session_id = handle["session_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post(
            "/v1/chat",
            json!({ "session_id": session_id, "text": "today was great" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let exchange = json_body(response).await;
    assert_eq!(exchange["user_message"]["sentiment"], "positive");
    let reply_text = exchange["reply"]["text"].as_str().unwrap();
    assert!(candidates(SentimentLabel::Positive).contains(&reply_text));

    let response = app
        .clone()
        .oneshot(get(&format!("/v1/chat/transcript?session_id={session_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let transcript = json_body(response).await;
    assert_eq!(transcript.as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(post("/v1/auth/logout", json!({ "session_id": session_id })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["closed"], true);

    let response = app
        .oneshot(get(&format!("/v1/chat/transcript?session_id={session_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registration_failures_surface_as_notices() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post(
            "/v1/auth/register",
            json!({
                "name": "Tiny",
                "password": "sunflower",
                "confirm_password": "sunflower",
                "birth_date": birth_date_for_age(3)
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"], "age_out_of_range");

    let response = app
        .clone()
        .oneshot(post(
            "/v1/auth/register",
            json!({
                "name": "Mira",
                "password": "sunflower",
                "confirm_password": "sunf1ower",
                "birth_date": birth_date_for_age(10)
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"], "password_mismatch");

    let response = app
        .clone()
        .oneshot(post(
            "/v1/auth/register",
            json!({
                "name": "Mira",
                "password": "abc",
                "confirm_password": "abc",
                "birth_date": birth_date_for_age(10)
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"], "weak_password");

    let response = app
        .oneshot(post(
            "/v1/auth/register",
            json!({
                "name": "",
                "password": "sunflower",
                "confirm_password": "sunflower",
                "birth_date": birth_date_for_age(10)
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"], "missing_field");
}

#[tokio::test]
async fn login_without_account_uses_demo_profile() {
    let app = test_app();
    let session_id = login(&app, "guest").await;

    let response = app
        .oneshot(get(&format!("/v1/restrictions?session_id={session_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let view = json_body(response).await;
    assert_eq!(view["age"], 12);
    assert_eq!(view["tier"], "elementary");
    assert_eq!(view["protection_label"], "Moderate Protection");
}

#[tokio::test]
async fn restrictions_by_age_blocks_gated_categories() {
    let app = test_app();

    let response = app.oneshot(get("/v1/restrictions?age=5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let view = json_body(response).await;
    let categories = view["categories"].as_array().unwrap();
    let find = |name: &str| {
        categories
            .iter()
            .find(|row| row["category"] == name)
            .unwrap()
    };

    assert_eq!(find("social_media")["allowed"], false);
    assert_eq!(find("social_media")["percentage"], 0);
    assert_eq!(find("news")["percentage"], 0);
    assert_eq!(find("gaming")["percentage"], 0);
    assert_eq!(find("educational")["percentage"], 100);
    assert_eq!(find("entertainment")["percentage"], 85);
}

#[tokio::test]
async fn toggles_round_trip_through_the_dashboard() {
    let app = test_app();
    let session_id = login(&app, "guest").await;

    let response = app
        .clone()
        .oneshot(post(
            "/v1/dashboard/toggle",
            json!({
                "session_id": session_id,
                "toggle": "web_protection",
                "enabled": false
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/v1/dashboard?session_id={session_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let dashboard = json_body(response).await;
    let toggles = dashboard["toggles"].as_array().unwrap();
    let web = toggles
        .iter()
        .find(|toggle| toggle["toggle"] == "web_protection")
        .unwrap();
    assert_eq!(web["enabled"], false);
    assert_eq!(dashboard["safety_score"], 98);
}

#[tokio::test]
async fn empty_chat_text_is_rejected() {
    let app = test_app();
    let session_id = login(&app, "guest").await;

    let response = app
        .oneshot(post(
            "/v1/chat",
            json!({ "session_id": session_id, "text": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"], "missing_field");
}
