//! Pipeline error types.

use thiserror::Error;
use yta_llm::LlmError;
use yta_models::YoutubeIdError;
use yta_store::StoreError;
use yta_youtube::YouTubeError;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    NotFound(String),

    #[error("This video is not suitable for critical analysis. Reason: {0}")]
    Unsuitable(String),

    #[error("{0}")]
    Precondition(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    #[error("YouTube error: {0}")]
    YouTube(#[from] YouTubeError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl From<YoutubeIdError> for AnalysisError {
    fn from(e: YoutubeIdError) -> Self {
        Self::InvalidUrl(e.to_string())
    }
}

impl AnalysisError {
    pub fn invalid_url(msg: impl Into<String>) -> Self {
        Self::InvalidUrl(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Stable machine-readable code for API responses and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::InvalidUrl(_) => "invalid_url",
            AnalysisError::NotFound(_) => "not_found",
            AnalysisError::Unsuitable(_) => "unsuitable",
            AnalysisError::Precondition(_) => "precondition",
            AnalysisError::Rejected(_) => "rejected",
            AnalysisError::Llm(LlmError::RateLimited { .. }) => "upstream_rate_limited",
            AnalysisError::Upstream(_) | AnalysisError::Llm(_) | AnalysisError::YouTube(_) => {
                "upstream"
            }
            AnalysisError::Store(StoreError::NotFound(_)) => "not_found",
            AnalysisError::Store(_) => "store",
        }
    }

    /// True when an external dependency (YouTube, model) failed.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AnalysisError::Upstream(_) | AnalysisError::Llm(_) | AnalysisError::YouTube(_)
        )
    }

    /// Check if error is retryable by the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Llm(e) => e.is_retryable(),
            AnalysisError::Store(e) => e.is_retryable(),
            AnalysisError::YouTube(e) => !e.is_missing_transcript(),
            _ => false,
        }
    }

    /// Suggested client back-off in milliseconds, when the upstream gave one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            AnalysisError::Llm(e) => e.retry_after_ms(),
            AnalysisError::Store(e) => e.retry_after_ms(),
            _ => None,
        }
    }
}
