pub mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Json, Query, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::NaiveDate;
use safenest_agents::{CompanionAgent, SessionNotFound};
use safenest_core::{
    restrictions_for_age, ChatInput, LoginForm, RegistrationForm, ToggleKind, ValidationError,
};
use safenest_observability::AppMetrics;
use safenest_storage::MemoryStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rate_limit::ClientRateLimiter;

pub const DEFAULT_API_KEY: &str = "dev-safenest-key";

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<CompanionAgent<MemoryStore>>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: ClientRateLimiter,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    metrics: safenest_observability::MetricsSnapshot,
}

#[derive(Debug, Clone, Deserialize)]
struct RegisterRequest {
    name: String,
    password: String,
    #[serde(default)]
    confirm_password: String,
    birth_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
struct LoginRequest {
    name: String,
    password: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LogoutRequest {
    session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatRequest {
    session_id: String,
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SessionQuery {
    session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RestrictionsQuery {
    session_id: Option<String>,
    age: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
struct ToggleRequest {
    session_id: String,
    toggle: ToggleKind,
    enabled: bool,
}

pub fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();
    let store = Arc::new(MemoryStore::new());

    let typing_delay = Duration::from_millis(env_or("SAFENEST_TYPING_DELAY_MS", 1500));
    let agent = Arc::new(CompanionAgent::with_typing_delay(
        store,
        metrics.clone(),
        typing_delay,
    ));

    let api_key = env::var("SAFENEST_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
    let window = Duration::from_secs(env_or("SAFENEST_RATE_LIMIT_WINDOW_SECONDS", 60));
    let max_requests = env_or("SAFENEST_RATE_LIMIT_MAX", 80) as usize;

    let state = ApiState {
        agent,
        metrics,
        api_key,
        limiter: ClientRateLimiter::new(window, max_requests),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/auth/register", post(register))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/logout", post(logout))
        .route("/v1/chat", post(chat))
        .route("/v1/chat/transcript", get(transcript))
        .route("/v1/restrictions", get(restrictions))
        .route("/v1/dashboard", get(dashboard))
        .route("/v1/dashboard/toggle", post(set_toggle))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

fn env_or(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok());
    if provided != Some(state.api_key.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "unauthorized",
                "message": "missing or invalid api key"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Response {
    if request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let client = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "local".to_string());

    if !state.limiter.allow(&client) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "rate_limited",
                "message": "too many requests, slow down"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn register(
    State(state): State<ApiState>,
    Json(input): Json<RegisterRequest>,
) -> Response {
    let form = RegistrationForm {
        name: input.name,
        password: input.password,
        confirm_password: input.confirm_password,
        birth_date: input.birth_date,
    };

    match state.agent.register(form).await {
        Ok(handle) => (StatusCode::OK, Json(handle)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn login(State(state): State<ApiState>, Json(input): Json<LoginRequest>) -> Response {
    let form = LoginForm {
        name: input.name,
        password: input.password,
    };

    match state.agent.login(form).await {
        Ok(handle) => (StatusCode::OK, Json(handle)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn logout(State(state): State<ApiState>, Json(input): Json<LogoutRequest>) -> Response {
    match state.agent.logout(&input.session_id).await {
        Ok(removed) => (StatusCode::OK, Json(json!({ "closed": removed }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn chat(State(state): State<ApiState>, Json(input): Json<ChatRequest>) -> Response {
    if input.text.trim().is_empty() {
        return notice(
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing_field",
            "chat text must not be empty",
        );
    }

    match state
        .agent
        .handle_message(ChatInput {
            session_id: input.session_id,
            text: input.text,
        })
        .await
    {
        Ok(exchange) => (StatusCode::OK, Json(exchange)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn transcript(State(state): State<ApiState>, Query(query): Query<SessionQuery>) -> Response {
    match state.agent.transcript(&query.session_id).await {
        Ok(messages) => (StatusCode::OK, Json(messages)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn restrictions(
    State(state): State<ApiState>,
    Query(query): Query<RestrictionsQuery>,
) -> Response {
    if let Some(session_id) = query.session_id.as_deref() {
        return match state.agent.restrictions(session_id).await {
            Ok(view) => (StatusCode::OK, Json(view)).into_response(),
            Err(error) => error_response(error),
        };
    }

    match query.age {
        Some(age) => (StatusCode::OK, Json(restrictions_for_age(age))).into_response(),
        None => notice(
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing_field",
            "provide session_id or age",
        ),
    }
}

async fn dashboard(State(state): State<ApiState>, Query(query): Query<SessionQuery>) -> Response {
    match state.agent.dashboard(&query.session_id).await {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn set_toggle(State(state): State<ApiState>, Json(input): Json<ToggleRequest>) -> Response {
    match state
        .agent
        .set_toggle(&input.session_id, input.toggle, input.enabled)
        .await
    {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(error) => error_response(error),
    }
}

fn notice(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

// Validation problems surface as recoverable notices; everything else is
// an internal failure.
fn error_response(error: anyhow::Error) -> Response {
    if let Some(validation) = error.downcast_ref::<ValidationError>() {
        return notice(
            StatusCode::UNPROCESSABLE_ENTITY,
            validation.code(),
            &validation.to_string(),
        );
    }

    if let Some(missing) = error.downcast_ref::<SessionNotFound>() {
        return notice(StatusCode::NOT_FOUND, "session_not_found", &missing.to_string());
    }

    tracing::error!(error = %error, "request failed");
    notice(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal",
        "unexpected error",
    )
}
