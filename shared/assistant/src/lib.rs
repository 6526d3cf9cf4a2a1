//! Chat models and message-routing helpers shared by the Momento services.

pub mod intent;
pub mod locator;
pub mod prompt;

pub use intent::is_image_request;
pub use locator::locate_image;
pub use prompt::extract_image_prompt;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Unique identifier assigned to a stored chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque identifier of the user owning a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Author of a chat message. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Owner rating of an assistant reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Up,
    Down,
}

impl Feedback {
    /// Parses the wire value. `None` means the value is not a known rating.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Feedback::Up),
            "down" => Some(Feedback::Down),
            _ => None,
        }
    }
}

/// A single message in a user's assistant conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub user_id: UserId,
    pub role: Role,
    pub content: String,
    /// `data:` URI or absolute HTTP(S) URL of a generated image.
    pub image_url: Option<String>,
    pub feedback: Option<Feedback>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

impl ChatMessage {
    pub fn new(
        user_id: UserId,
        role: Role,
        content: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            user_id,
            role,
            content: content.into(),
            image_url,
            feedback: None,
            created_at: now_ms(),
        }
    }
}

/// The pair of messages persisted for one chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
