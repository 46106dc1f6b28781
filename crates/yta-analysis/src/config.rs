//! Pipeline configuration.

use std::time::Duration;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// How long a cached stage result stays valid
    pub cache_ttl: Duration,
    /// Maximum number of videos held in the stage cache
    pub cache_max_videos: usize,
    /// Transcript characters sent to the stage 1 prompt
    pub transcript_max_chars: usize,
    /// Transcript characters persisted with the record
    pub stored_transcript_max_chars: usize,
    pub video_max_tokens: u32,
    pub critical_max_tokens: u32,
    pub additional_max_tokens: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(86_400), // 24 hours
            cache_max_videos: 500,
            transcript_max_chars: 100_000,
            stored_transcript_max_chars: 10_000,
            video_max_tokens: 8192,
            critical_max_tokens: 8192,
            additional_max_tokens: 8192,
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_ttl: std::env::var("ANALYSIS_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_max_videos: std::env::var("ANALYSIS_CACHE_MAX_VIDEOS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.cache_max_videos),
            transcript_max_chars: std::env::var("TRANSCRIPT_MAX_CHARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.transcript_max_chars),
            stored_transcript_max_chars: std::env::var("STORED_TRANSCRIPT_MAX_CHARS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.stored_transcript_max_chars),
            video_max_tokens: std::env::var("VIDEO_ANALYSIS_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.video_max_tokens),
            critical_max_tokens: std::env::var("CRITICAL_ANALYSIS_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.critical_max_tokens),
            additional_max_tokens: std::env::var("ADDITIONAL_ANALYSIS_MAX_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.additional_max_tokens),
        }
    }
}
