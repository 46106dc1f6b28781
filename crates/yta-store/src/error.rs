//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Row not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited, retry after {0}ms")]
    RateLimited(u64),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::NotConfigured(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Map an HTTP error status to a store error.
    pub fn from_http_status(status: u16, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        match status {
            401 | 403 => StoreError::AuthError(msg),
            404 => StoreError::NotFound(msg),
            409 => StoreError::Conflict(msg),
            429 => StoreError::RateLimited(1000),
            500..=599 => StoreError::ServerError(status, msg),
            _ => StoreError::RequestFailed(msg),
        }
    }

    /// HTTP status for metrics, when the error came from a response.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            StoreError::AuthError(_) => Some(401),
            StoreError::NotFound(_) => Some(404),
            StoreError::Conflict(_) => Some(409),
            StoreError::RateLimited(_) => Some(429),
            StoreError::ServerError(status, _) => Some(*status),
            StoreError::RequestFailed(_) => Some(400),
            _ => None,
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotConfigured(_) => "not_configured",
            StoreError::AuthError(_) => "auth",
            StoreError::NotFound(_) => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::RequestFailed(_) => "request_failed",
            StoreError::ServerError(..) => "server_error",
            StoreError::InvalidResponse(_) => "invalid_response",
            StoreError::RateLimited(_) => "rate_limited",
            StoreError::Network(_) => "network",
            StoreError::Json(_) => "json",
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Network(_) | StoreError::RateLimited(_) | StoreError::ServerError(..)
        )
    }

    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            StoreError::RateLimited(ms) => Some(*ms),
            _ => None,
        }
    }
}
