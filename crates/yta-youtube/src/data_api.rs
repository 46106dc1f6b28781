//! YouTube Data API v3 client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use yta_models::VideoInfo;

use crate::config::YouTubeConfig;
use crate::error::{YouTubeError, YouTubeResult};
use crate::VideoCatalog;

/// Video and channel statistics via the YouTube Data API.
pub struct YouTubeDataClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeDataClient {
    pub fn new(api_key: impl Into<String>, config: &YouTubeConfig) -> YouTubeResult<Self> {
        let http = Client::builder().timeout(config.http_timeout).build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: config.api_base_url.clone(),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        resource: &str,
        part: &str,
        id: &str,
    ) -> YouTubeResult<T> {
        let url = format!("{}/youtube/v3/{}", self.base_url, resource);
        let response = self
            .http
            .get(&url)
            .query(&[("part", part), ("id", id), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YouTubeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Subscriber count for a channel. Failures are logged and yield `None`.
    async fn subscriber_count(&self, channel_id: &str) -> Option<u64> {
        if channel_id.is_empty() {
            return None;
        }

        match self
            .get::<ListResponse<ChannelItem>>("channels", "statistics", channel_id)
            .await
        {
            Ok(list) => list
                .items
                .into_iter()
                .next()
                .and_then(|item| item.statistics.subscriber_count)
                .and_then(|count| count.parse().ok()),
            Err(e) => {
                warn!(channel_id, error = %e, "Failed to fetch channel statistics");
                None
            }
        }
    }
}

#[async_trait]
impl VideoCatalog for YouTubeDataClient {
    async fn video_info(&self, video_id: &str) -> YouTubeResult<Option<VideoInfo>> {
        debug!(video_id, "Fetching video info from YouTube Data API");

        let list: ListResponse<VideoItem> =
            self.get("videos", "snippet,statistics", video_id).await?;

        let Some(item) = list.items.into_iter().next() else {
            return Ok(None);
        };

        let snippet = item.snippet;
        let stats = item.statistics;

        let mut info = VideoInfo::new(video_id, snippet.title, snippet.channel_title);
        info.thumbnail_url = snippet.thumbnails.best_url();
        info.channel_id = snippet.channel_id;
        info.description = snippet.description;
        info.published_at = snippet.published_at;
        info.view_count = parse_count(stats.view_count.as_deref());
        info.like_count = parse_count(stats.like_count.as_deref());
        info.comment_count = parse_count(stats.comment_count.as_deref());

        let subscribers = self.subscriber_count(&info.channel_id).await;
        Ok(Some(info.with_subscriber_count(subscribers)))
    }
}

fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: Snippet,
    #[serde(default)]
    statistics: VideoStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    channel_id: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    maxres: Option<Thumbnail>,
    high: Option<Thumbnail>,
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

impl Thumbnails {
    fn best_url(&self) -> String {
        [&self.maxres, &self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|thumb| thumb.url.as_str())
            .find(|url| !url.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoStatistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    #[serde(default)]
    statistics: ChannelStatistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    subscriber_count: Option<String>,
}
