//! Security utilities for input validation.
//!
//! This module provides:
//! - Video URL validation with a YouTube host whitelist (SSRF protection)
//! - Analysis ID and video ID validation for path parameters

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;
use yta_models::is_valid_youtube_id;

/// Maximum URL length to prevent DoS attacks.
const MAX_URL_LENGTH: usize = 2048;

/// Maximum analysis ID length (UUIDs are 36).
const MAX_ANALYSIS_ID_LENGTH: usize = 64;

/// Allowed video URL domains.
static ALLOWED_DOMAINS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "youtube.com",
        "www.youtube.com",
        "m.youtube.com",
        "music.youtube.com",
        "youtu.be",
        "www.youtu.be",
    ])
});

/// Blocked URL patterns (sensitive endpoints).
static BLOCKED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Internal IP ranges
        r"^https?://127\.",
        r"^https?://localhost",
        r"^https?://0\.0\.0\.0",
        r"^https?://10\.",
        r"^https?://172\.(1[6-9]|2[0-9]|3[0-1])\.",
        r"^https?://192\.168\.",
        r"^https?://169\.254\.",
        r"^https?://\[::1\]",
        r"^https?://\[fd",
        r"^https?://\[fe80",
        // Cloud metadata endpoints
        r"^https?://metadata\.",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("static regex"))
    .collect()
});

/// Result of URL validation.
#[derive(Debug)]
pub enum UrlValidationResult {
    /// URL is valid and allowed.
    Valid(String),
    /// URL is malformed or uses an unsupported protocol.
    Invalid(String),
    /// URL domain is not a YouTube host.
    DomainNotAllowed(String),
    /// URL matches a blocked pattern (e.g., internal IPs).
    Blocked(String),
    /// URL exceeds maximum length.
    TooLong,
}

impl UrlValidationResult {
    /// Convert to Result for easy error handling.
    pub fn into_result(self) -> Result<String, String> {
        match self {
            Self::Valid(url) => Ok(url),
            Self::Invalid(msg) => Err(msg),
            Self::DomainNotAllowed(domain) => Err(format!(
                "Domain '{}' is not allowed. Only YouTube URLs are supported",
                domain
            )),
            Self::Blocked(reason) => Err(reason),
            Self::TooLong => Err(format!(
                "URL exceeds maximum length of {} characters",
                MAX_URL_LENGTH
            )),
        }
    }
}

/// Validate a video URL for length, protocol, blocked targets and host.
pub fn validate_video_url(url: &str) -> UrlValidationResult {
    if url.len() > MAX_URL_LENGTH {
        return UrlValidationResult::TooLong;
    }

    let url = url.trim();
    if url.is_empty() {
        return UrlValidationResult::Invalid("URL cannot be empty".to_string());
    }

    let parsed = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => return UrlValidationResult::Invalid(format!("Invalid URL format: {}", e)),
    };

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return UrlValidationResult::Invalid(format!(
                "Invalid protocol '{}'. Only HTTP and HTTPS are allowed.",
                scheme
            ))
        }
    }

    for pattern in BLOCKED_PATTERNS.iter() {
        if pattern.is_match(url) {
            warn!(url = %url, "Blocked URL pattern detected");
            return UrlValidationResult::Blocked(
                "URL appears to target an internal or restricted endpoint".to_string(),
            );
        }
    }

    let domain = match parsed.host_str() {
        Some(d) => d.to_lowercase(),
        None => return UrlValidationResult::Invalid("URL must have a valid domain".to_string()),
    };

    if !ALLOWED_DOMAINS.contains(domain.as_str()) {
        return UrlValidationResult::DomainNotAllowed(domain);
    }

    UrlValidationResult::Valid(url.to_string())
}

/// Validate analysis ID format: 1-64 ASCII alphanumerics or hyphens.
pub fn is_valid_analysis_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ANALYSIS_ID_LENGTH
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Validate a YouTube video ID (11 chars of `[A-Za-z0-9_-]`).
pub fn is_valid_video_id(id: &str) -> bool {
    is_valid_youtube_id(id)
}
