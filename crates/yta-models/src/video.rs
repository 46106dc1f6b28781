//! Video metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metadata and performance statistics for a YouTube video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoInfo {
    pub video_id: String,
    pub title: String,
    pub channel_name: String,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub description: String,
    /// RFC 3339 publish time as reported by YouTube
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_sub_ratio: Option<f64>,
}

impl VideoInfo {
    pub fn new(
        video_id: impl Into<String>,
        title: impl Into<String>,
        channel_name: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            title: title.into(),
            channel_name: channel_name.into(),
            ..Default::default()
        }
    }

    /// Set the subscriber count and derive `view_sub_ratio` from it.
    pub fn with_subscriber_count(mut self, subscriber_count: Option<u64>) -> Self {
        self.subscriber_count = subscriber_count;
        self.view_sub_ratio = view_sub_ratio(self.view_count, subscriber_count);
        self
    }

    /// Canonical watch URL for this video.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

/// Views per subscriber rounded to two decimals; `None` without a positive subscriber count.
pub fn view_sub_ratio(view_count: u64, subscriber_count: Option<u64>) -> Option<f64> {
    let subscribers = subscriber_count.filter(|s| *s > 0)?;
    let ratio = view_count as f64 / subscribers as f64;
    Some((ratio * 100.0).round() / 100.0)
}
