//! Error types for the document QA pipeline

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
///
/// The taxonomy is deliberate: `Validation` is client-caused and never
/// retried, the service variants (`Embedding`, `Llm`, `Condensation`,
/// `IndexQuery`, `IndexWrite`) are dependency failures, `IndexProvisioning`
/// is fatal for the request that needed the index, and `Pipeline` marks an
/// internal state violation that indicates a bug.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing input from the client
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source document could not be parsed into text
    #[error("Chunking failed: {0}")]
    Chunking(String),

    /// Embedding service transport or auth failure
    #[error("Embedding service unavailable: {0}")]
    Embedding(String),

    /// LLM completion failure
    #[error("LLM error: {0}")]
    Llm(String),

    /// Standalone-question condensation failure
    #[error("Question condensation failed: {0}")]
    Condensation(String),

    /// Vector index creation or readiness failure
    #[error("Index provisioning failed: {0}")]
    IndexProvisioning(String),

    /// Vector index query failure
    #[error("Index query failed: {0}")]
    IndexQuery(String),

    /// Vector index write failure
    #[error("Index write failed: {0}")]
    IndexWrite(String),

    /// Internal chain-state violation; should not occur in correct operation
    #[error("Pipeline state violation: {0}")]
    Pipeline(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a chunking error
    pub fn chunking(message: impl Into<String>) -> Self {
        Self::Chunking(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a condensation error
    pub fn condensation(message: impl Into<String>) -> Self {
        Self::Condensation(message.into())
    }

    /// Create a provisioning error
    pub fn provisioning(message: impl Into<String>) -> Self {
        Self::IndexProvisioning(message.into())
    }

    /// Create an index query error
    pub fn index_query(message: impl Into<String>) -> Self {
        Self::IndexQuery(message.into())
    }

    /// Create an index write error
    pub fn index_write(message: impl Into<String>) -> Self {
        Self::IndexWrite(message.into())
    }

    /// Create a pipeline-state error
    pub fn pipeline(message: impl Into<String>) -> Self {
        Self::Pipeline(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Client-caused errors carry their message; everything else gets a
        // generic public message and the detail goes to the log only.
        let (status, error_type, public) = match &self {
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            Error::Chunking(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "chunking_error",
                "The source document could not be processed.".to_string(),
            ),
            Error::Embedding(_) => (
                StatusCode::BAD_GATEWAY,
                "embedding_error",
                "The embedding service is unavailable. Try again later.".to_string(),
            ),
            Error::Llm(_) | Error::Condensation(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "llm_error",
                "The language model is unavailable. Try again later.".to_string(),
            ),
            Error::IndexProvisioning(_) => (
                StatusCode::BAD_GATEWAY,
                "index_provisioning_error",
                "The search index could not be provisioned.".to_string(),
            ),
            Error::IndexQuery(_) | Error::IndexWrite(_) => (
                StatusCode::BAD_GATEWAY,
                "index_error",
                "The search index is unavailable. Try again later.".to_string(),
            ),
            Error::Http(_) => (
                StatusCode::BAD_GATEWAY,
                "upstream_error",
                "An upstream service failed.".to_string(),
            ),
            Error::Config(_) | Error::Pipeline(_) | Error::Io(_) | Error::Json(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Something went wrong. Try again!".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": public,
            }
        }));

        (status, body).into_response()
    }
}
