//! OpenRouter chat-completions client serving both provider roles.

use super::{
    ImageGeneration, ImageGenerationRequest, ProviderError, Result, TextCompletion,
    TextCompletionRequest,
};
use crate::config::ProviderConfig;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    referer: String,
}

impl OpenRouterClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            referer: config.referer.clone(),
        })
    }

    async fn post<T: Serialize + ?Sized>(&self, body: &T) -> Result<Value> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TextCompletion for OpenRouterClient {
    async fn complete(&self, request: TextCompletionRequest) -> Result<Value> {
        debug!(model = %request.model, turns = request.messages.len(), "text completion request");
        self.post(&request).await
    }
}

#[async_trait]
impl ImageGeneration for OpenRouterClient {
    async fn generate(&self, request: ImageGenerationRequest) -> Result<Value> {
        debug!(model = %request.model, "image generation request");
        self.post(&request).await
    }
}
