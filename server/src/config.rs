use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Most recent messages sent to the text model as context.
pub const MAX_HISTORY_MESSAGES: usize = 10;

/// Runtime configuration for the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub build_id: String,
    /// Directory of the sled message database.
    pub data_dir: PathBuf,
    /// Browser origin allowed by CORS and sent as the provider referer.
    pub client_url: String,
    pub provider: ProviderConfig,
}

/// Settings for the text and image model providers.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub endpoint: String,
    pub referer: String,
    pub text_model: String,
    pub image_model: String,
    pub image_aspect_ratio: String,
    pub max_tokens: u32,
    pub history_limit: usize,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("PORT").unwrap_or(4000);
        let build_id =
            env::var("MOMENTO_BUILD_ID").unwrap_or_else(|_| Uuid::new_v4().to_string());
        let data_dir = env::var("MOMENTO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/momento"));
        let client_url =
            env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let provider = ProviderConfig::from_env(&client_url);

        Ok(Self {
            host,
            port,
            build_id,
            data_dir,
            client_url,
            provider,
        })
    }
}

impl ProviderConfig {
    pub fn from_env(referer: &str) -> Self {
        let defaults = Self::default();
        if env::var("OPENROUTER_API_KEY").is_err() {
            tracing::warn!("OPENROUTER_API_KEY is not set; provider calls will be rejected");
        }

        Self {
            api_key: env::var("OPENROUTER_API_KEY").unwrap_or_default(),
            endpoint: env::var("OPENROUTER_URL").unwrap_or(defaults.endpoint),
            referer: referer.to_string(),
            text_model: env::var("MOMENTO_TEXT_MODEL").unwrap_or(defaults.text_model),
            image_model: env::var("MOMENTO_IMAGE_MODEL").unwrap_or(defaults.image_model),
            image_aspect_ratio: env::var("MOMENTO_IMAGE_ASPECT_RATIO")
                .unwrap_or(defaults.image_aspect_ratio),
            max_tokens: parse_var("MOMENTO_MAX_TOKENS").unwrap_or(defaults.max_tokens),
            history_limit: parse_var::<usize>("MOMENTO_HISTORY_LIMIT")
                .map(|limit| limit.min(MAX_HISTORY_MESSAGES))
                .unwrap_or(defaults.history_limit),
            request_timeout: parse_var("MOMENTO_PROVIDER_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.min(MAX_HISTORY_MESSAGES);
        self
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            referer: "http://localhost:3000".to_string(),
            text_model: "google/gemini-2.0-flash-001".to_string(),
            image_model: "google/gemini-2.5-flash-image-preview".to_string(),
            image_aspect_ratio: "1:1".to_string(),
            max_tokens: 150,
            history_limit: MAX_HISTORY_MESSAGES,
            request_timeout: Duration::from_secs(60),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_limit_never_exceeds_window() {
        let config = ProviderConfig::default().with_history_limit(500);
        assert_eq!(config.history_limit, MAX_HISTORY_MESSAGES);

        let config = ProviderConfig::default().with_history_limit(4);
        assert_eq!(config.history_limit, 4);
    }
}
