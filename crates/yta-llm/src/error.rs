//! LLM client error types.

use thiserror::Error;

pub type LlmResult<T> = Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Model overloaded: {0}")]
    Overloaded(String),

    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Failed to parse model output: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Map a non-success HTTP status to an error.
    pub fn from_http_status(status: u16, body: String, retry_after_ms: Option<u64>) -> Self {
        match status {
            401 | 403 => Self::Auth(body),
            429 => Self::RateLimited { retry_after_ms },
            529 => Self::Overloaded(body),
            500..=599 => Self::Server { status, body },
            _ => Self::Request(format!("HTTP {}: {}", status, body)),
        }
    }

    /// Transient errors worth retrying against the same model.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited { .. }
                | LlmError::Overloaded(_)
                | LlmError::Server { .. }
                | LlmError::Network(_)
        )
    }

    /// False when switching to a fallback model cannot help.
    pub fn allows_fallback(&self) -> bool {
        !matches!(self, LlmError::Auth(_) | LlmError::Config(_))
    }

    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            LlmError::RateLimited { retry_after_ms } => *retry_after_ms,
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Auth(_) => "auth",
            LlmError::RateLimited { .. } => "rate_limited",
            LlmError::Overloaded(_) => "overloaded",
            LlmError::Server { .. } => "server",
            LlmError::Request(_) => "request",
            LlmError::Network(_) => "network",
            LlmError::EmptyResponse => "empty",
            LlmError::Parse(_) => "parse",
            LlmError::Config(_) => "config",
        }
    }
}
