//! Search configuration.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.tavily.com";

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Tavily API key; search is disabled without it
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl SearchConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: std::env::var("TAVILY_API_KEY")
                .ok()
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
            base_url: std::env::var("TAVILY_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(
                std::env::var("TAVILY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(20),
            ),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::remove_var("TAVILY_API_KEY");
        std::env::set_var("TAVILY_BASE_URL", "http://localhost:9999/");
        let config = SearchConfig::from_env();
        assert!(!config.is_enabled());
        assert_eq!(config.base_url, "http://localhost:9999");

        std::env::set_var("TAVILY_API_KEY", "tvly-test");
        assert!(SearchConfig::from_env().is_enabled());

        std::env::remove_var("TAVILY_API_KEY");
        std::env::remove_var("TAVILY_BASE_URL");
    }
}
