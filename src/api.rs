//! HTTP API for the companion backend
//!
//! ## Endpoint Map
//!
//! | Route     | Method | Description                          |
//! |-----------|--------|--------------------------------------|
//! | `/`       | GET    | Service banner and endpoint map      |
//! | `/health` | GET    | Load balancer health probe           |
//! | `/chat`   | POST   | One conversational turn              |
//!
//! The chat contract mirrors what frontends already speak: a JSON body with
//! a required `message` and optional `session_id`, answered with
//! `{response, session_id, status}`. Malformed input gets a 400 with an
//! explanatory message and mutates no state.

use crate::engine::ConversationEngine;
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The conversation engine behind every `/chat` turn
    pub engine: Arc<ConversationEngine>,
}

/// Build the complete HTTP application.
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/chat", post(chat))
        .with_state(state)
        .layer(build_cors(cors_origins))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: Option<String>,
    session_id: Option<String>,
}

async fn chat(
    State(state): State<AppState>,
    payload: Option<Json<ChatRequest>>,
) -> (StatusCode, Json<Value>) {
    let Some(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No data provided", "status": "error"})),
        );
    };

    let message = request.message.as_deref().unwrap_or("").trim().to_string();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Message is required", "status": "error"})),
        );
    }

    let turn = state
        .engine
        .handle_message(&message, request.session_id.as_deref())
        .await;

    (
        StatusCode::OK,
        Json(json!({
            "response": turn.response,
            "session_id": turn.session_id,
            "status": "success",
        })),
    )
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "Hearth Companion API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn home() -> Json<Value> {
    Json(json!({
        "message": "Hearth Companion API",
        "endpoints": {
            "chat": "/chat (POST)",
            "health": "/health (GET)",
        },
    }))
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HearthConfig;
    use crate::error::Result;
    use crate::memory::MemoryStore;
    use crate::model::{CompletionBackend, PromptMessage};
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct EchoBackend;

    #[async_trait]
    impl CompletionBackend for EchoBackend {
        async fn complete(&self, _messages: &[PromptMessage]) -> Result<String> {
            Ok("That sounds really tough.".to_string())
        }
    }

    async fn app_state() -> (AppState, TempDir) {
        let dir = TempDir::new().unwrap();
        let mut config = HearthConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();
        let store = MemoryStore::new(dir.path()).await.unwrap();
        let engine = ConversationEngine::new(store, Arc::new(EchoBackend), &config);
        (
            AppState {
                engine: Arc::new(engine),
            },
            dir,
        )
    }

    #[tokio::test]
    async fn test_chat_success() {
        let (state, _dir) = app_state().await;
        let (status, Json(body)) = chat(
            State(state),
            Some(Json(ChatRequest {
                message: Some("my name is Raj, I can't sleep".to_string()),
                session_id: None,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["response"], "That sounds really tough.");
        assert!(body["session_id"].as_str().unwrap().contains('_'));
    }

    #[tokio::test]
    async fn test_chat_missing_body() {
        let (state, _dir) = app_state().await;
        let (status, Json(body)) = chat(State(state), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_chat_blank_message() {
        let (state, _dir) = app_state().await;
        let (status, Json(body)) = chat(
            State(state),
            Some(Json(ChatRequest {
                message: Some("   ".to_string()),
                session_id: None,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Message is required");
    }

    #[tokio::test]
    async fn test_chat_missing_message_field() {
        let (state, _dir) = app_state().await;
        let (status, Json(body)) = chat(
            State(state),
            Some(Json(ChatRequest {
                message: None,
                session_id: Some("whatever".to_string()),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_session_id_round_trips() {
        let (state, _dir) = app_state().await;

        let (_, Json(first)) = chat(
            State(state.clone()),
            Some(Json(ChatRequest {
                message: Some("my name is Priya".to_string()),
                session_id: None,
            })),
        )
        .await;
        let sid = first["session_id"].as_str().unwrap().to_string();

        let (status, Json(second)) = chat(
            State(state),
            Some(Json(ChatRequest {
                message: Some("hello again".to_string()),
                session_id: Some(sid.clone()),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["session_id"], sid.as_str());
    }

    #[tokio::test]
    async fn test_health_check() {
        let Json(body) = health_check().await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_home_lists_endpoints() {
        let Json(body) = home().await;
        assert!(body["endpoints"]["chat"].as_str().unwrap().contains("POST"));
    }

    #[test]
    fn test_build_cors_empty_origins() {
        let _cors = build_cors(&[]);
    }

    #[test]
    fn test_build_cors_with_origins() {
        let _cors = build_cors(&[
            "http://localhost:5173".to_string(),
            "https://app.example.com".to_string(),
        ]);
    }
}
