//! Per-message flow: persist, classify, generate, persist the reply.

use super::{ChatError, Result};
use crate::config::ProviderConfig;
use crate::providers::{
    reported_error, ImageGeneration, ImageGenerationRequest, PromptTurn, ProviderError,
    TextCompletion, TextCompletionRequest,
};
use crate::storage::MessageStore;
use momento_assistant::{
    extract_image_prompt, is_image_request, locate_image, ChatExchange, ChatMessage, Role, UserId,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SYSTEM_PROMPT: &str = "You are Momento AI, the intelligent assistant for Momento social network.

YOUR ROLE: Help users grow their social media presence with creative captions, post ideas, and engagement tips.

RULES:
1. Keep responses SHORT (under 50 words) - this is a mobile chat
2. Be casual, friendly, and trendy
3. Use emojis sparingly but effectively
4. Skip formal greetings - dive right in
5. For caption requests, give 2-3 options
6. Be encouraging and positive";

pub const TEXT_FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response. Try again!";

pub const IMAGE_FAILURE_REPLY: &str = "I couldn't generate the image. Please try again.";

/// Routes each user message to the text or image provider and records both
/// sides of the exchange.
pub struct ChatPipeline {
    config: ProviderConfig,
    store: Arc<dyn MessageStore>,
    text: Arc<dyn TextCompletion>,
    image: Arc<dyn ImageGeneration>,
}

impl ChatPipeline {
    pub fn new(
        config: ProviderConfig,
        store: Arc<dyn MessageStore>,
        text: Arc<dyn TextCompletion>,
        image: Arc<dyn ImageGeneration>,
    ) -> Self {
        Self {
            config,
            store,
            text,
            image,
        }
    }

    pub fn store(&self) -> &dyn MessageStore {
        self.store.as_ref()
    }

    /// Handles one user message.
    ///
    /// The user message is stored before any provider call and stays stored
    /// whatever happens next. Text provider failures are returned as errors;
    /// image failures produce a fallback assistant reply.
    pub async fn send_message(&self, user_id: &UserId, content: &str) -> Result<ChatExchange> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let user_message = self.store.append(user_id, Role::User, content, None)?;

        let assistant_message = if is_image_request(content) {
            info!(user = %user_id, "routing message to image generation");
            self.reply_with_image(user_id, content).await?
        } else {
            debug!(user = %user_id, "routing message to text completion");
            self.reply_with_text(user_id).await?
        };

        Ok(ChatExchange {
            user_message,
            assistant_message,
        })
    }

    async fn reply_with_image(&self, user_id: &UserId, content: &str) -> Result<ChatMessage> {
        let prompt = extract_image_prompt(content);
        let request = ImageGenerationRequest::single_turn(
            self.config.image_model.as_str(),
            format!("Generate an image of: {prompt}"),
            self.config.image_aspect_ratio.as_str(),
        );

        let image_url = match self.image.generate(request).await {
            Ok(response) => match reported_error(&response) {
                Some(message) => {
                    warn!(user = %user_id, error = %message, "image provider reported an error");
                    None
                }
                None => {
                    let located = locate_image(&response);
                    if located.is_none() {
                        warn!(user = %user_id, "no image found in provider response");
                    }
                    located
                }
            },
            Err(e) => {
                warn!(user = %user_id, error = %e, "image generation failed");
                None
            }
        };

        let message = match image_url {
            Some(url) => self.store.append(
                user_id,
                Role::Assistant,
                &format!("Here's your image of {prompt}"),
                Some(url),
            )?,
            None => self
                .store
                .append(user_id, Role::Assistant, IMAGE_FAILURE_REPLY, None)?,
        };
        Ok(message)
    }

    async fn reply_with_text(&self, user_id: &UserId) -> Result<ChatMessage> {
        let history = self
            .store
            .recent_history(user_id, self.config.history_limit)?;

        let messages = std::iter::once(PromptTurn::new("system", SYSTEM_PROMPT))
            .chain(
                history
                    .into_iter()
                    .map(|message| PromptTurn::new(message.role.as_str(), message.content)),
            )
            .collect();

        let request = TextCompletionRequest {
            model: self.config.text_model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
        };

        let response = self.text.complete(request).await.map_err(|e| {
            warn!(user = %user_id, error = %e, "text completion failed");
            e
        })?;
        if let Some(message) = reported_error(&response) {
            warn!(user = %user_id, error = %message, "text provider reported an error");
            return Err(ProviderError::Reported(message).into());
        }

        let reply = response
            .pointer("/choices/0/message/content")
            .and_then(|content| content.as_str())
            .filter(|content| !content.is_empty())
            .unwrap_or(TEXT_FALLBACK_REPLY);

        Ok(self.store.append(user_id, Role::Assistant, reply, None)?)
    }
}
