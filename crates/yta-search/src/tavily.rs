//! Tavily search API client.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::{SearchError, SearchResult};
use crate::{metrics, truncate_chars, SearchHit, WebSearch, SNIPPET_MAX_CHARS};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    search_depth: &'static str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

pub struct TavilyClient {
    http: Client,
    config: SearchConfig,
}

impl TavilyClient {
    pub fn new(config: SearchConfig) -> SearchResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> SearchResult<Self> {
        Self::new(SearchConfig::from_env())
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn search(&self, query: &str, max_results: u32) -> SearchResult<Vec<SearchHit>> {
        let Some(api_key) = &self.config.api_key else {
            metrics::record_search("disabled", 0.0);
            return Ok(Vec::new());
        };

        debug!(query, max_results, "Tavily search");

        let start = Instant::now();
        let response = self
            .http
            .post(format!("{}/search", self.config.base_url))
            .bearer_auth(api_key)
            .json(&SearchRequest {
                query,
                search_depth: "basic",
                max_results,
            })
            .send()
            .await;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                metrics::record_search("error", latency_ms);
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            metrics::record_search("error", latency_ms);
            let body = response.text().await.unwrap_or_default();
            warn!(query, status = status.as_u16(), "Tavily search failed");
            return Err(SearchError::from_http_status(status.as_u16(), body));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        let hits: Vec<SearchHit> = body
            .results
            .into_iter()
            .filter_map(|r| {
                let url = r.url.filter(|u| !u.is_empty())?;
                Some(SearchHit {
                    title: r.title.unwrap_or_default(),
                    url,
                    snippet: truncate_chars(&r.content.unwrap_or_default(), SNIPPET_MAX_CHARS),
                })
            })
            .collect();

        metrics::record_search(if hits.is_empty() { "miss" } else { "hit" }, latency_ms);
        debug!(query, hits = hits.len(), "Tavily search complete");
        Ok(hits)
    }

    fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }
}
