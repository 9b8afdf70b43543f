#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use akkichat::{config::AkkiConfig, router::RouterBuilder, state::AppState};
use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Value, json};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "wonderland";
pub const API_KEY: &str = "apikey-123";
pub const SECRET_KEY: &str = "s3cret-key";
pub const PROVIDER_KEY: &str = "sk-ant-test";
pub const ORIGIN: &str = "http://localhost:5173";

/// How the stand-in provider answers
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Echo,
    Overloaded,
    NoText,
}

#[derive(Clone)]
struct FakeProvider {
    hits: Arc<AtomicUsize>,
    mode: Upstream,
}

async fn fake_messages(
    State(fake): State<FakeProvider>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    fake.hits.fetch_add(1, Ordering::SeqCst);
    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(PROVIDER_KEY)
        || headers.get("anthropic-version").is_none()
    {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}})),
        )
            .into_response();
    }
    match fake.mode {
        Upstream::Echo => {
            let content = body["messages"][0]["content"].as_str().unwrap_or_default();
            Json(json!({
                "id": "msg_test",
                "type": "message",
                "role": "assistant",
                "model": body["model"],
                "content": [{"type": "text", "text": format!("You said: {content}")}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 5, "output_tokens": 4}
            }))
            .into_response()
        }
        Upstream::Overloaded => (
            StatusCode::from_u16(529).unwrap(),
            Json(json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}})),
        )
            .into_response(),
        Upstream::NoText => Json(json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "model": body["model"],
            "content": [],
            "stop_reason": "end_turn"
        }))
        .into_response(),
    }
}

/// Local stand-in for the Messages API; returns its base url and hit counter
pub async fn spawn_provider(mode: Upstream) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/v1/messages", post(fake_messages))
        .with_state(FakeProvider {
            hits: hits.clone(),
            mode,
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), hits)
}

pub fn test_config(endpoint: &str, provider_key: Option<&str>) -> AkkiConfig {
    serde_json::from_value(json!({
        "username": USERNAME,
        "password": PASSWORD,
        "api_key": API_KEY,
        "secret_key": SECRET_KEY,
        "anthropic_api_key": provider_key,
        "anthropic_endpoint": endpoint,
        "request_timeout_secs": 10,
    }))
    .unwrap()
}

pub fn app(config: AkkiConfig) -> Router {
    let state = AppState::new(config).unwrap();
    RouterBuilder::new(state).with_default_setup().build()
}

/// Router wired to a fresh stand-in provider
pub async fn app_with_provider(mode: Upstream) -> (Router, Arc<AtomicUsize>) {
    let (endpoint, hits) = spawn_provider(mode).await;
    (app(test_config(&endpoint, Some(PROVIDER_KEY))), hits)
}

pub fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

pub fn chat_request(body: Value, api_key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/chat")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn json_body(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
