//! API routes for the chat server

pub mod chat;
pub mod ingest;

use axum::{
    routing::{get, post},
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/ingest", post(ingest::ingest_corpus))
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "name": "docchat-rag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Conversational document QA with streamed answers and source citations",
        "endpoints": {
            "POST /api/chat": "Ask a question; streams the answer followed by a [SOURCES] block",
            "POST /api/ingest": "Ingest the configured source document into the index",
            "GET /api/info": "This document"
        }
    }))
}
