//! Web search and cited-source verification.
//!
//! [`TavilyClient`] talks to the Tavily search API behind the [`WebSearch`]
//! trait. [`SourceVerifier`] layers the lookup strategies used to attach links
//! to sources cited in model output (books, interview clips, evidence, typed
//! sources) on top of any [`WebSearch`] implementation.

pub mod classify;
pub mod config;
pub mod error;
pub mod metrics;
mod names;
pub mod tavily;
pub mod verifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use classify::{classify_source_type, generate_search_keywords};
pub use config::SearchConfig;
pub use error::{SearchError, SearchResult};
pub use tavily::TavilyClient;
pub use verifier::{SourceLookup, SourceVerifier};

/// Snippets are cut to this many characters.
pub const SNIPPET_MAX_CHARS: usize = 200;

/// A single web search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// A web search backend.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> SearchResult<Vec<SearchHit>>;

    /// False when the backend is not configured and every search returns nothing.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Truncate to at most `max` characters.
pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
