//! Web chat server
//!
//! Serves a single conversation over HTTP.
//!
//! # Endpoints
//!
//! - GET / - Transcript page with the message form
//! - POST /consume_message - Form post (`user_message`), redirects to /
//! - POST /api/chat - `{"message": ...}` -> `{"reply": ..., "mode": ...}`
//! - GET /api/history - Transcript as JSON
//! - GET /health - Liveness probe

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use sdk::{ChatReply, ChatRequest, EngineError, TranscriptEntry};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::agent::ConversationAgent;

pub mod page;

/// One conversation plus its visible transcript
///
/// The agent lock serialises turns. The transcript has its own lock so the
/// page and history stay readable while a turn is in flight.
pub struct ChatSession {
    agent: Mutex<ConversationAgent>,
    transcript: RwLock<Vec<TranscriptEntry>>,
}

impl ChatSession {
    pub fn new(agent: ConversationAgent) -> Self {
        Self {
            agent: Mutex::new(agent),
            transcript: RwLock::new(Vec::new()),
        }
    }

    /// Run one turn and record both sides in the transcript
    pub async fn exchange(&self, message: &str) -> ChatReply {
        let mut agent = self.agent.lock().await;

        self.transcript
            .write()
            .await
            .push(TranscriptEntry::user(message));

        let reply = agent.respond(message).await;

        self.transcript
            .write()
            .await
            .push(TranscriptEntry::assistant(reply.reply.clone()));
        reply
    }

    /// Snapshot of the transcript so far
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.read().await.clone()
    }
}

/// State shared across handlers
#[derive(Clone)]
pub struct ServerState {
    pub session: Arc<ChatSession>,
}

impl ServerState {
    pub fn new(session: ChatSession) -> Self {
        Self {
            session: Arc::new(session),
        }
    }
}

/// Form body of POST /consume_message
#[derive(Debug, Deserialize)]
struct MessageForm {
    #[serde(default)]
    user_message: String,
}

/// Build the router
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(index_handler))
        .route("/consume_message", post(consume_message_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/history", get(history_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve until ctrl-c
pub async fn serve(addr: SocketAddr, state: ServerState) -> Result<(), EngineError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| EngineError::Network(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Chat server listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Chat server shutting down gracefully");
        })
        .await
        .map_err(|e| EngineError::Network(format!("Server error: {}", e)))
}

async fn index_handler(State(state): State<ServerState>) -> Html<String> {
    let transcript = state.session.transcript().await;
    Html(page::render_page(&transcript))
}

async fn consume_message_handler(
    State(state): State<ServerState>,
    Form(form): Form<MessageForm>,
) -> Redirect {
    let message = form.user_message.trim();
    if !message.is_empty() {
        state.session.exchange(message).await;
    }
    Redirect::to("/")
}

async fn chat_handler(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let message = request.message.trim();
    if message.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Missing 'message' field"})),
        )
            .into_response();
    }

    let reply = state.session.exchange(message).await;
    Json(reply).into_response()
}

async fn history_handler(State(state): State<ServerState>) -> Json<Vec<TranscriptEntry>> {
    Json(state.session.transcript().await)
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
