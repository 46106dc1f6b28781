//! API configuration.

/// Default browser origins when `CORS_ORIGINS` is not set.
const DEFAULT_LOCAL_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Per-IP requests per second on `/api`
    pub rate_limit_rps: u32,
    /// Per-IP requests per second on routes that call the model
    pub analyze_rate_limit_rps: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Serve Prometheus metrics at `/metrics`
    pub metrics_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: default_origins(None),
            rate_limit_rps: 10,
            analyze_rate_limit_rps: 2,
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            metrics_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                })
                .filter(|origins| !origins.is_empty())
                .unwrap_or_else(|| default_origins(std::env::var("FRONTEND_URL").ok())),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            analyze_rate_limit_rps: std::env::var("ANALYZE_RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            metrics_enabled: std::env::var("METRICS_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

fn default_origins(frontend_url: Option<String>) -> Vec<String> {
    frontend_url
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .into_iter()
        .chain(DEFAULT_LOCAL_ORIGINS.iter().map(|o| o.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "API_PORT",
            "CORS_ORIGINS",
            "FRONTEND_URL",
            "RATE_LIMIT_RPS",
            "ANALYZE_RATE_LIMIT_RPS",
            "METRICS_ENABLED",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = ApiConfig::from_env();
        assert_eq!(config.port, 8000);
        assert_eq!(config.rate_limit_rps, 10);
        assert_eq!(config.analyze_rate_limit_rps, 2);
        assert!(config.metrics_enabled);
        assert_eq!(
            config.cors_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
    }

    #[test]
    #[serial]
    fn test_frontend_url_joins_default_origins() {
        clear_env();
        std::env::set_var("FRONTEND_URL", "https://analyzer.example.com/");
        let config = ApiConfig::from_env();
        assert_eq!(config.cors_origins[0], "https://analyzer.example.com");
        assert_eq!(config.cors_origins.len(), 3);

        std::env::set_var("CORS_ORIGINS", "https://a.example.com, https://b.example.com");
        let config = ApiConfig::from_env();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
        clear_env();
    }
}
