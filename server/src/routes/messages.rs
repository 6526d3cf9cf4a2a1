//! Assistant conversation endpoints.

use super::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use momento_assistant::{ChatExchange, ChatMessage, Feedback, MessageId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct MessageList {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: &'static str,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/messages/chat", post(send_message))
        .route("/api/messages", get(list_messages).delete(clear_messages))
        .route("/api/messages/:message_id/feedback", put(update_feedback))
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatExchange>, ApiError> {
    let exchange = state.chat().send_message(&user_id, &payload.content).await?;
    Ok(Json(exchange))
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<MessageList>, ApiError> {
    let messages = state
        .messages()
        .history(&user_id)
        .map_err(|e| ApiError::storage("Failed to fetch messages", e))?;
    Ok(Json(MessageList { messages }))
}

/// Accepts `{"feedback": "up" | "down" | null}`; `null` clears the rating.
async fn update_feedback(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    Path(message_id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ChatMessage>, ApiError> {
    let feedback = match body.get("feedback") {
        Some(Value::Null) => None,
        Some(Value::String(value)) => Some(
            Feedback::parse(value)
                .ok_or_else(|| ApiError::BadRequest("Invalid feedback value".to_string()))?,
        ),
        _ => return Err(ApiError::BadRequest("Invalid feedback value".to_string())),
    };

    let not_found = || ApiError::NotFound("Message not found".to_string());
    let message_id = Uuid::parse_str(&message_id)
        .map(MessageId)
        .map_err(|_| not_found())?;

    let updated = state
        .messages()
        .set_feedback(&user_id, &message_id, feedback)
        .map_err(|e| ApiError::storage("Failed to update feedback", e))?
        .ok_or_else(not_found)?;

    debug!(user = %user_id, message = %message_id, ?feedback, "feedback updated");
    Ok(Json(updated))
}

async fn clear_messages(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<StatusMessage>, ApiError> {
    let removed = state
        .messages()
        .clear(&user_id)
        .map_err(|e| ApiError::storage("Failed to clear conversation", e))?;
    info!(user = %user_id, removed, "conversation cleared");
    Ok(Json(StatusMessage {
        message: "Conversation cleared",
    }))
}
