//! YouTube access configuration.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com";

#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// YouTube Data API key; without it metadata comes from yt-dlp
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub ytdlp_path: String,
    pub ytdlp_timeout: Duration,
    pub cookies_path: Option<PathBuf>,
    /// Preferred caption languages, in order
    pub transcript_languages: Vec<String>,
    /// Proxy for yt-dlp and caption downloads
    pub proxy_url: Option<String>,
    pub http_timeout: Duration,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            ytdlp_path: "yt-dlp".to_string(),
            ytdlp_timeout: Duration::from_secs(60),
            cookies_path: None,
            transcript_languages: vec!["ko".to_string(), "en".to_string()],
            proxy_url: None,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl YouTubeConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_key: non_empty_var("YOUTUBE_API_KEY"),
            api_base_url: non_empty_var("YOUTUBE_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            ytdlp_path: non_empty_var("YTDLP_PATH").unwrap_or(defaults.ytdlp_path),
            ytdlp_timeout: Duration::from_secs(
                std::env::var("YTDLP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
            cookies_path: non_empty_var("YTDLP_COOKIES")
                .map(PathBuf::from)
                .filter(|path| path.exists()),
            transcript_languages: non_empty_var("TRANSCRIPT_LANGUAGES")
                .map(|s| {
                    s.split(',')
                        .map(|lang| lang.trim().to_string())
                        .filter(|lang| !lang.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.transcript_languages),
            proxy_url: non_empty_var("TRANSCRIPT_PROXY_URL"),
            http_timeout: defaults.http_timeout,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
