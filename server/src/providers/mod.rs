//! Text and image model providers used by the chat pipeline.

mod openrouter;

pub use openrouter::OpenRouterClient;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Errors returned by a provider call. Every variant means the call failed.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(String),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider response could not be decoded: {0}")]
    Decode(String),
    #[error("provider reported an error: {0}")]
    Reported(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

/// One conversation turn sent to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptTurn {
    pub role: String,
    pub content: String,
}

impl PromptTurn {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextCompletionRequest {
    pub model: String,
    pub messages: Vec<PromptTurn>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub messages: Vec<PromptTurn>,
    pub modalities: Vec<String>,
    pub image_config: ImageConfig,
}

impl ImageGenerationRequest {
    /// A single-turn request for an image rendered from `instruction`.
    pub fn single_turn(
        model: impl Into<String>,
        instruction: impl Into<String>,
        aspect_ratio: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![PromptTurn::new("user", instruction)],
            modalities: vec!["image".to_string(), "text".to_string()],
            image_config: ImageConfig {
                aspect_ratio: aspect_ratio.into(),
            },
        }
    }
}

/// Chat-completion style text generation.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// Returns the raw JSON response of a successful call.
    async fn complete(&self, request: TextCompletionRequest) -> Result<Value>;
}

/// Image generation. The response shape is provider-defined.
#[async_trait]
pub trait ImageGeneration: Send + Sync {
    async fn generate(&self, request: ImageGenerationRequest) -> Result<Value>;
}

/// Error message carried in a provider payload, if any.
pub fn reported_error(response: &Value) -> Option<String> {
    match response.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(
            other
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        ),
    }
}
