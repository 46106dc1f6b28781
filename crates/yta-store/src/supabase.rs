//! Supabase (PostgREST) analysis store.
//!
//! Production-grade client with:
//! - HTTP client tuning (pooling, timeouts)
//! - Exponential backoff with jitter
//! - Observability (tracing spans, metrics)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info_span, Instrument};
use yta_models::{AnalysisPatch, AnalysisRecord, HistoryItem, NewAnalysis, HISTORY_COLUMNS};

use crate::config::SupabaseConfig;
use crate::error::{StoreError, StoreResult};
use crate::metrics::observe;
use crate::retry::with_retry;
use crate::AnalysisStore;

const RETURN_REPRESENTATION: &str = "return=representation";
const COUNT_EXACT: &str = "count=exact";
const BACKEND: &str = "supabase";

pub struct SupabaseStore {
    http: Client,
    config: SupabaseConfig,
    table_url: String,
}

impl SupabaseStore {
    pub fn new(config: SupabaseConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("yta-store/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StoreError::Network)?;

        let table_url = config.table_url();
        Ok(Self {
            http,
            config,
            table_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    fn request(&self, method: reqwest::Method) -> RequestBuilder {
        self.http
            .request(method, &self.table_url)
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    async fn execute_request<T, F>(&self, operation: &'static str, id: Option<&str>, fut: F) -> StoreResult<T>
    where
        F: std::future::Future<Output = StoreResult<T>>,
    {
        let span = match id {
            Some(id) => info_span!("store_request", operation = %operation, table = %self.config.table, id = %id),
            None => info_span!("store_request", operation = %operation, table = %self.config.table),
        };

        let result = observe(BACKEND, operation, fut.instrument(span.clone())).await;
        if let Err(e) = &result {
            let _guard = span.enter();
            debug!(kind = e.kind(), "Store request failed: {}", e);
        }
        result
    }

    async fn handle_error_response(operation: &str, response: Response) -> StoreError {
        let status = response.status();
        let retry_after_ms = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body = response.text().await.unwrap_or_default();

        let error = StoreError::from_http_status(status.as_u16(), format!("{} failed: {}", operation, body));
        match (error, retry_after_ms) {
            (StoreError::RateLimited(_), Some(ms)) => StoreError::RateLimited(ms),
            (error, _) => error,
        }
    }

    async fn rows<T: DeserializeOwned>(operation: &str, response: Response) -> StoreResult<Vec<T>> {
        if !response.status().is_success() {
            return Err(Self::handle_error_response(operation, response).await);
        }
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| StoreError::invalid_response(format!("{}: {}", operation, e)))
    }

    /// Fetch at most one full row matching a filter.
    async fn select_one(
        &self,
        operation: &'static str,
        filter: (&str, String),
        order_latest: bool,
    ) -> StoreResult<Option<AnalysisRecord>> {
        let id = filter.1.clone();
        self.execute_request(operation, Some(&id), async {
            with_retry(&self.config.retry, operation, || async {
                let mut query: Vec<(&str, String)> = vec![("select", "*".to_string()), filter.clone()];
                if order_latest {
                    query.push(("order", "created_at.desc".to_string()));
                }
                query.push(("limit", "1".to_string()));

                let response = self.request(reqwest::Method::GET).query(&query).send().await?;
                let rows: Vec<AnalysisRecord> = Self::rows(operation, response).await?;
                Ok(rows.into_iter().next())
            })
            .await
        })
        .await
    }
}

/// Total from a `Content-Range` header such as `0-19/42` or `*/0`.
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl AnalysisStore for SupabaseStore {
    async fn insert(&self, new: NewAnalysis) -> StoreResult<AnalysisRecord> {
        self.execute_request("insert", Some(&new.video_id), async {
            with_retry(&self.config.retry, "insert", || async {
                let response = self
                    .request(reqwest::Method::POST)
                    .header("Prefer", RETURN_REPRESENTATION)
                    .json(&new)
                    .send()
                    .await?;
                let rows: Vec<AnalysisRecord> = Self::rows("insert", response).await?;
                rows.into_iter()
                    .next()
                    .ok_or_else(|| StoreError::invalid_response("insert returned no rows"))
            })
            .await
        })
        .await
    }

    async fn get(&self, id: &str) -> StoreResult<Option<AnalysisRecord>> {
        self.select_one("get", ("id", format!("eq.{}", id)), false).await
    }

    async fn find_by_video_id(&self, video_id: &str) -> StoreResult<Option<AnalysisRecord>> {
        self.select_one("find_by_video_id", ("video_id", format!("eq.{}", video_id)), true)
            .await
    }

    async fn update(&self, id: &str, patch: AnalysisPatch) -> StoreResult<Option<AnalysisRecord>> {
        if patch.is_empty() {
            return self.get(id).await;
        }

        self.execute_request("update", Some(id), async {
            with_retry(&self.config.retry, "update", || async {
                let response = self
                    .request(reqwest::Method::PATCH)
                    .query(&[("id", format!("eq.{}", id))])
                    .header("Prefer", RETURN_REPRESENTATION)
                    .json(&patch)
                    .send()
                    .await?;
                let rows: Vec<AnalysisRecord> = Self::rows("update", response).await?;
                Ok(rows.into_iter().next())
            })
            .await
        })
        .await
    }

    async fn history(&self, limit: u32, offset: u32) -> StoreResult<Vec<HistoryItem>> {
        self.execute_request("history", None, async {
            with_retry(&self.config.retry, "history", || async {
                let response = self
                    .request(reqwest::Method::GET)
                    .query(&[
                        ("select", HISTORY_COLUMNS.to_string()),
                        ("order", "created_at.desc".to_string()),
                        ("offset", offset.to_string()),
                        ("limit", limit.to_string()),
                    ])
                    .send()
                    .await?;
                Self::rows("history", response).await
            })
            .await
        })
        .await
    }

    async fn count(&self) -> StoreResult<u64> {
        self.execute_request("count", None, async {
            with_retry(&self.config.retry, "count", || async {
                let response = self
                    .request(reqwest::Method::HEAD)
                    .query(&[("select", "id")])
                    .header("Prefer", COUNT_EXACT)
                    .send()
                    .await?;

                if !response.status().is_success() {
                    return Err(Self::handle_error_response("count", response).await);
                }

                response
                    .headers()
                    .get(header::CONTENT_RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_content_range_total)
                    .ok_or_else(|| StoreError::invalid_response("count: missing Content-Range total"))
            })
            .await
        })
        .await
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        self.execute_request("delete", Some(id), async {
            with_retry(&self.config.retry, "delete", || async {
                let response = self
                    .request(reqwest::Method::DELETE)
                    .query(&[("id", format!("eq.{}", id))])
                    .header("Prefer", RETURN_REPRESENTATION)
                    .send()
                    .await?;
                let rows: Vec<serde_json::Value> = Self::rows("delete", response).await?;
                debug!(id, deleted = rows.len(), "Delete complete");
                Ok(!rows.is_empty())
            })
            .await
        })
        .await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.execute_request("ping", None, async {
            let response = self
                .request(reqwest::Method::GET)
                .query(&[("select", "id"), ("limit", "1")])
                .send()
                .await?;
            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::NOT_FOUND => Err(StoreError::not_configured(format!(
                    "table {} does not exist",
                    self.config.table
                ))),
                _ => Err(Self::handle_error_response("ping", response).await),
            }
        })
        .await
    }

    fn backend(&self) -> &'static str {
        BACKEND
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryConfig;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TABLE_PATH: &str = "/rest/v1/analyses";

    fn store(server: &MockServer) -> SupabaseStore {
        let config = SupabaseConfig::new(server.uri(), "service-key").with_retry(RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        });
        SupabaseStore::new(config).unwrap()
    }

    fn row(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "video_id": "dQw4w9WgXcQ",
            "video_title": "버핏의 투자 원칙",
            "video_url": "https://youtu.be/dQw4w9WgXcQ",
            "channel_name": "투자 채널",
            "thumbnail_url": null,
            "summary": "요약",
            "key_points": ["a", "b"],
            "quotes": [],
            "perspective": null,
            "critical_analysis": null,
            "created_at": "2024-05-01T10:00:00.123456+00:00"
        })
    }

    #[tokio::test]
    async fn test_insert_returns_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TABLE_PATH))
            .and(header("apikey", "service-key"))
            .and(header("authorization", "Bearer service-key"))
            .and(header("prefer", "return=representation"))
            .and(body_partial_json(json!({"video_id": "dQw4w9WgXcQ", "summary": "요약"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([row("42")])))
            .expect(1)
            .mount(&server)
            .await;

        let mut new = NewAnalysis {
            video_id: "dQw4w9WgXcQ".into(),
            ..Default::default()
        };
        new.analysis.summary = "요약".into();

        let record = store(&server).insert(new).await.unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.thumbnail_url, "");
        assert_eq!(record.analysis.key_points, vec!["a", "b"]);
        assert!(record.created_at.is_some());
    }

    #[tokio::test]
    async fn test_get_missing_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("id", "eq.nope"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert!(store(&server).get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_video_id_orders_latest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("video_id", "eq.dQw4w9WgXcQ"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("7")])))
            .mount(&server)
            .await;

        let record = store(&server)
            .find_by_video_id("dQw4w9WgXcQ")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id, "7");
    }

    #[tokio::test]
    async fn test_history_projection_and_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TABLE_PATH))
            .and(query_param("select", HISTORY_COLUMNS))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("offset", "20"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 3, "video_id": "dQw4w9WgXcQ", "video_title": "t", "created_at": "2024-05-01T10:00:00Z"}
            ])))
            .mount(&server)
            .await;

        let items = store(&server).history(10, 20).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "3");
    }

    #[tokio::test]
    async fn test_count_from_content_range() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path(TABLE_PATH))
            .and(header("prefer", "count=exact"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-range", "0-0/42"))
            .mount(&server)
            .await;

        assert_eq!(store(&server).count().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_delete_reports_whether_row_existed() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(query_param("id", "eq.1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("1")])))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(query_param("id", "eq.2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let store = store(&server);
        assert!(store.delete("1").await.unwrap());
        assert!(!store.delete("2").await.unwrap());
    }

    #[tokio::test]
    async fn test_critical_update_clears_additional_column() {
        let server = MockServer::start().await;
        let mut updated = row("5");
        updated["perspective"] = json!("psychology");
        Mock::given(method("PATCH"))
            .and(query_param("id", "eq.5"))
            .and(body_partial_json(
                json!({"perspective": "psychology", "additional_analysis": null}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([updated])))
            .mount(&server)
            .await;

        let record = store(&server)
            .update(
                "5",
                AnalysisPatch::critical("psychology", yta_models::CriticalAnalysis::default()),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.perspective.as_deref(), Some("psychology"));
    }

    #[tokio::test]
    async fn test_retries_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([row("9")])))
            .mount(&server)
            .await;

        let record = store(&server).get("9").await.unwrap().unwrap();
        assert_eq!(record.id, "9");
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string("column does not exist"))
            .expect(1)
            .mount(&server)
            .await;

        let err = store(&server).get("1").await.unwrap_err();
        assert!(matches!(err, StoreError::RequestFailed(_)));
    }

    #[test]
    fn test_parse_content_range_total() {
        assert_eq!(parse_content_range_total("0-19/42"), Some(42));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-19/*"), None);
    }
}
