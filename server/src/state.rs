use crate::chat::ChatPipeline;
use crate::config::AppConfig;
use crate::providers::OpenRouterClient;
use crate::storage::{MessageStore, SledMessageStore};
use std::sync::Arc;

pub struct AppState {
    config: AppConfig,
    chat: ChatPipeline,
}

impl AppState {
    pub fn new(config: AppConfig, chat: ChatPipeline) -> Arc<Self> {
        Arc::new(Self { config, chat })
    }

    /// Opens the message database and provider client named by `config`.
    pub fn open(config: AppConfig) -> anyhow::Result<Arc<Self>> {
        let store = Arc::new(SledMessageStore::open(&config.data_dir)?);
        let client = Arc::new(OpenRouterClient::new(&config.provider)?);
        let chat = ChatPipeline::new(config.provider.clone(), store, client.clone(), client);
        Ok(Self::new(config, chat))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build_id(&self) -> &str {
        &self.config.build_id
    }

    pub fn chat(&self) -> &ChatPipeline {
        &self.chat
    }

    pub fn messages(&self) -> &dyn MessageStore {
        self.chat.store()
    }
}
