//! API Routes

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{chat_handler, chat_ws_handler, health_check, welcome};
use crate::state::AppState;

/// Health and agent API, without static files or middleware
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/api/welcome", get(welcome))

        // Agent API
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/ws", get(chat_ws_handler))
}
