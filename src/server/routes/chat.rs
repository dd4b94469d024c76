//! Chat endpoint: streamed answers with trailing source attribution

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};

use crate::chain::encode_answer_stream;
use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::ChatRequest;

/// POST /api/chat - Ask a question about the corpus
///
/// Validation happens before the pipeline is invoked; failures during
/// condensation or retrieval return a structured JSON error, because no
/// bytes of the stream have been written yet. Once the stream is open, a
/// generation failure aborts the body instead of completing it.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Response> {
    let (question, history) = request.into_parts()?;
    tracing::info!(question = %question, "chat request");

    let answer = state.chain().run(&question, &history).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from_stream(encode_answer_stream(answer)))
        .map_err(|e| Error::pipeline(format!("failed to build response: {e}")))
}
