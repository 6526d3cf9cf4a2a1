//! HTTP error responses.
//!
//! Handlers return `Result<T, ApiError>`; client errors carry their message,
//! internal failures are logged and answered with a generic message.

use crate::chat::ChatError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Chat(#[from] ChatError),
    /// `client_message` is what the caller sees.
    #[error("storage error: {source}")]
    Storage {
        client_message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn storage(client_message: &'static str, source: anyhow::Error) -> Self {
        Self::Storage {
            client_message,
            source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Chat(ChatError::EmptyMessage) => (
                StatusCode::BAD_REQUEST,
                "Message content required".to_string(),
            ),
            ApiError::Chat(e) => {
                error!(error = %e, "chat message failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process message. Please try again.".to_string(),
                )
            }
            ApiError::Storage {
                client_message,
                source,
            } => {
                error!(error = ?source, "message store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    client_message.to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
