//! yt-dlp probing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};
use yta_models::VideoInfo;

use crate::config::YouTubeConfig;
use crate::error::{YouTubeError, YouTubeResult};
use crate::VideoCatalog;

/// Subset of `yt-dlp --dump-single-json` output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct YtDlpInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    pub channel: Option<String>,
    pub uploader: Option<String>,
    pub channel_id: Option<String>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    /// `YYYYMMDD`
    pub upload_date: Option<String>,
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
    pub channel_follower_count: Option<u64>,
    /// Manually uploaded captions by language
    #[serde(deserialize_with = "null_as_default")]
    pub subtitles: BTreeMap<String, Vec<CaptionFormat>>,
    /// Auto-generated captions by language
    #[serde(deserialize_with = "null_as_default")]
    pub automatic_captions: BTreeMap<String, Vec<CaptionFormat>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CaptionFormat {
    pub ext: String,
    pub url: String,
    pub name: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl YtDlpInfo {
    pub fn into_video_info(self, video_id: &str) -> VideoInfo {
        let channel_name = self.channel.or(self.uploader).unwrap_or_default();
        let mut info = VideoInfo::new(video_id, self.title, channel_name);
        info.channel_id = self.channel_id.unwrap_or_default();
        info.thumbnail_url = self.thumbnail.unwrap_or_default();
        info.description = self.description.unwrap_or_default();
        info.published_at = self
            .upload_date
            .as_deref()
            .map(format_upload_date)
            .unwrap_or_default();
        info.view_count = self.view_count.unwrap_or(0);
        info.like_count = self.like_count.unwrap_or(0);
        info.comment_count = self.comment_count.unwrap_or(0);
        info.with_subscriber_count(self.channel_follower_count)
    }
}

/// `20240501` → `2024-05-01`; other shapes pass through.
fn format_upload_date(date: &str) -> String {
    if date.len() == 8 && date.chars().all(|c| c.is_ascii_digit()) {
        format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])
    } else {
        date.to_string()
    }
}

/// Runs yt-dlp with the configured binary, cookies and proxy.
#[derive(Debug, Clone)]
pub struct YtDlp {
    config: YouTubeConfig,
}

impl YtDlp {
    pub fn new(config: YouTubeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &YouTubeConfig {
        &self.config
    }

    /// Probe a video without downloading it.
    pub async fn probe(&self, video_id: &str) -> YouTubeResult<YtDlpInfo> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let mut args: Vec<String> = vec![
            "--dump-single-json".into(),
            "--skip-download".into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
        ];
        if let Some(proxy) = &self.config.proxy_url {
            args.push("--proxy".into());
            args.push(proxy.clone());
        }
        if let Some(cookies) = &self.config.cookies_path {
            args.push("--cookies".into());
            args.push(cookies.to_string_lossy().into_owned());
        }
        args.push(url);

        info!(video_id, "Probing video with yt-dlp");

        let timeout = self.config.ytdlp_timeout;
        let output = match tokio::time::timeout(
            timeout,
            tokio::process::Command::new(&self.config.ytdlp_path)
                .args(&args)
                .kill_on_drop(true)
                .output(),
        )
        .await
        {
            Ok(result) => result
                .map_err(|e| YouTubeError::ytdlp(format!("failed to run yt-dlp: {}", e)))?,
            Err(_) => {
                warn!(video_id, "yt-dlp probe timed out");
                return Err(YouTubeError::Timeout(timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                video_id,
                status = ?output.status.code(),
                error = %stderr.trim(),
                "yt-dlp probe failed"
            );
            return Err(YouTubeError::ytdlp(stderr.trim().to_string()));
        }

        let info: YtDlpInfo = serde_json::from_slice(&output.stdout)?;
        debug!(
            video_id,
            subtitles = info.subtitles.len(),
            automatic_captions = info.automatic_captions.len(),
            "yt-dlp probe complete"
        );
        Ok(info)
    }
}

/// Metadata catalog backed by yt-dlp, used when no Data API key is configured.
pub struct YtDlpCatalog {
    ytdlp: YtDlp,
}

impl YtDlpCatalog {
    pub fn new(ytdlp: YtDlp) -> Self {
        Self { ytdlp }
    }
}

#[async_trait]
impl VideoCatalog for YtDlpCatalog {
    async fn video_info(&self, video_id: &str) -> YouTubeResult<Option<VideoInfo>> {
        match self.ytdlp.probe(video_id).await {
            Ok(info) if info.title.is_empty() => Ok(None),
            Ok(info) => Ok(Some(info.into_video_info(video_id))),
            // yt-dlp reports removed/private videos as errors
            Err(YouTubeError::YtDlp(msg)) if msg.contains("Video unavailable") => Ok(None),
            Err(e) => Err(e),
        }
    }
}
