//! Assistant chat pipeline routing messages to text or image generation.

mod pipeline;

pub use pipeline::{ChatPipeline, IMAGE_FAILURE_REPLY, SYSTEM_PROMPT, TEXT_FALLBACK_REPLY};

use crate::providers::ProviderError;

/// Errors surfaced to callers of the chat pipeline.
///
/// Image generation failures are not represented here: they are answered
/// with a fallback assistant message instead.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message content required")]
    EmptyMessage,
    #[error("text completion failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
