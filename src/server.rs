// http server mode - run the assistant as an api

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use crate::core::{CheckIn, Rejected};
use crate::{Chat, ChatTurn, Error, Session};

struct AppState {
    chat: Chat,
    sessions: RwLock<HashMap<String, Session>>,
}

#[derive(Deserialize)]
struct ChatRequest {
    user_id: String,
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    turn: Option<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub struct Server;

impl Server {
    pub fn router(chat: Chat) -> Router {
        let state = Arc::new(AppState {
            chat,
            sessions: RwLock::new(HashMap::new()),
        });

        Router::new()
            .route("/health", get(health))
            .route("/sessions", post(open_session))
            .route("/sessions/{user_id}/check-ins", post(add_check_in))
            .route("/chat", post(send_message))
            .route("/history/{user_id}", get(history))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    pub async fn run(chat: Chat, host: &str, port: u16) -> Result<(), Error> {
        let app = Self::router(chat);

        let addr = format!("{host}:{port}");
        tracing::info!("server running at http://{addr}");

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| Error::Server(e.to_string()))?;

        Ok(())
    }
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// registers the patient, replacing any earlier session for the same id
async fn open_session(
    State(state): State<Arc<AppState>>,
    Json(session): Json<Session>,
) -> (StatusCode, Json<Session>) {
    tracing::info!(user = %session.user_id(), "session opened");
    state
        .sessions
        .write()
        .await
        .insert(session.user_id().to_string(), session.clone());

    (StatusCode::CREATED, Json(session))
}

async fn add_check_in(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(check_in): Json<CheckIn>,
) -> StatusCode {
    match state.sessions.write().await.get_mut(&user_id) {
        Some(session) => {
            session.record_check_in(check_in);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    // snapshot so the lock isn't held while the model thinks
    let session = state.sessions.read().await.get(&req.user_id).cloned();

    match state.chat.handle_turn(session.as_ref(), &req.message).await {
        Ok(turn) => (
            StatusCode::OK,
            Json(ChatResponse {
                turn: Some(turn),
                error: None,
            }),
        ),
        Err(rejected) => {
            let status = match rejected {
                Rejected::EmptyMessage => StatusCode::UNPROCESSABLE_ENTITY,
                Rejected::NoSession => StatusCode::NOT_FOUND,
                Rejected::Busy(_) => StatusCode::CONFLICT,
            };
            (
                status,
                Json(ChatResponse {
                    turn: None,
                    error: Some(rejected.to_string()),
                }),
            )
        }
    }
}

async fn history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.chat.history().for_user(&user_id).await {
        Ok(turns) => (StatusCode::OK, Json(serde_json::json!({ "turns": turns }))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}
