//! Search error types.

use thiserror::Error;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Search rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}

impl SearchError {
    pub fn from_http_status(status: u16, body: String) -> Self {
        match status {
            429 => SearchError::RateLimited,
            _ => SearchError::Api { status, body },
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::Api { .. } => "api",
            SearchError::RateLimited => "rate_limited",
            SearchError::Network(_) => "network",
            SearchError::InvalidResponse(_) => "invalid_response",
        }
    }
}
