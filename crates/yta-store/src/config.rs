//! Supabase connection configuration.

use std::time::Duration;

use crate::error::{StoreError, StoreResult};
use crate::retry::RetryConfig;

pub const DEFAULT_TABLE: &str = "analyses";

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Service or anon key, sent as `apikey` and bearer token
    pub key: String,
    pub table: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub retry: RetryConfig,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            key: key.into(),
            table: DEFAULT_TABLE.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }

    /// Create config from environment variables.
    ///
    /// Fails with [`StoreError::NotConfigured`] when `SUPABASE_URL` or
    /// `SUPABASE_KEY` is missing.
    pub fn from_env() -> StoreResult<Self> {
        let url = non_empty_var("SUPABASE_URL")
            .ok_or_else(|| StoreError::not_configured("SUPABASE_URL must be set"))?;
        let key = non_empty_var("SUPABASE_KEY")
            .ok_or_else(|| StoreError::not_configured("SUPABASE_KEY must be set"))?;

        let mut config = Self::new(url, key);
        if let Some(table) = non_empty_var("SUPABASE_TABLE") {
            config.table = table;
        }
        if let Some(secs) = non_empty_var("SUPABASE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            config.timeout = Duration::from_secs(secs);
        }
        config.retry = RetryConfig::from_env();
        Ok(config)
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// PostgREST endpoint for the analyses table.
    pub fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
