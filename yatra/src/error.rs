use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Message shown to callers when a dialogue turn fails inside the pipeline.
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process message";

#[derive(Error, Debug)]
pub enum YatraError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Content error: {0}")]
    Content(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API rate limit exceeded, retry after {retry_after:?} seconds")]
    ApiRateLimit { retry_after: Option<u64> },

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("{PROCESSING_FAILED_MESSAGE}")]
    ProcessingFailed,
}

impl YatraError {
    /// Errors raised before any network call because the caller sent bad input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

impl IntoResponse for YatraError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            YatraError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            YatraError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            YatraError::Content(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            YatraError::Embedding(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            YatraError::VectorIndex(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            YatraError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            YatraError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            YatraError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            YatraError::ApiRateLimit { .. } => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            YatraError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            YatraError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            YatraError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            YatraError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            YatraError::LlmRateLimit { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("LLM rate limit exceeded, retry after {retry_after:?} seconds"),
            ),
            YatraError::ProcessingFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                PROCESSING_FAILED_MESSAGE.to_string(),
            ),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, YatraError>;
