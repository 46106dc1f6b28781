//! Anthropic client configuration.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key; empty means unconfigured
    pub api_key: String,
    pub base_url: String,
    /// Primary model
    pub model: String,
    /// Tried in order when the primary model fails
    pub fallback_models: Vec<String>,
    pub timeout: Duration,
    /// Retries per model for transient failures
    pub max_retries: u32,
    /// Base delay for the exponential retry backoff
    pub retry_base_delay: Duration,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            fallback_models: Vec::new(),
            timeout: Duration::from_secs(180),
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl AnthropicConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: std::env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            base_url: std::env::var("ANTHROPIC_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: std::env::var("ANTHROPIC_MODEL").unwrap_or(defaults.model),
            fallback_models: std::env::var("ANTHROPIC_FALLBACK_MODELS")
                .map(|s| {
                    s.split(',')
                        .map(|m| m.trim().to_string())
                        .filter(|m| !m.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            timeout: Duration::from_secs(
                std::env::var("ANTHROPIC_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(180),
            ),
            max_retries: std::env::var("ANTHROPIC_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            retry_base_delay: defaults.retry_base_delay,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Primary model followed by fallbacks, without duplicates.
    pub fn models(&self) -> Vec<&str> {
        let mut models = vec![self.model.as_str()];
        for model in &self.fallback_models {
            if !models.contains(&model.as_str()) {
                models.push(model.as_str());
            }
        }
        models
    }
}
