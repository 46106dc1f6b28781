//! YouTube error types.

use thiserror::Error;

pub type YouTubeResult<T> = Result<T, YouTubeError>;

#[derive(Debug, Error)]
pub enum YouTubeError {
    #[error("YouTube API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("yt-dlp failed: {0}")]
    YtDlp(String),

    #[error("yt-dlp timed out after {0} seconds")]
    Timeout(u64),

    #[error("No transcript available for video {0}")]
    NoTranscript(String),

    #[error("Caption download failed: {0}")]
    Download(String),

    #[error("Transcript is empty for video {0}")]
    EmptyTranscript(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl YouTubeError {
    pub fn ytdlp(msg: impl Into<String>) -> Self {
        Self::YtDlp(msg.into())
    }

    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// True when the video simply has no usable captions.
    pub fn is_missing_transcript(&self) -> bool {
        matches!(
            self,
            YouTubeError::NoTranscript(_) | YouTubeError::EmptyTranscript(_)
        )
    }
}
