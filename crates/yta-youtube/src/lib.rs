//! YouTube metadata and transcript retrieval.
//!
//! - [`YouTubeDataClient`]: YouTube Data API v3 (video + channel statistics)
//! - [`YtDlpCatalog`]: metadata from a yt-dlp probe when no API key is configured
//! - [`YtDlpTranscriptSource`]: caption track selection, download and parsing

pub mod captions;
pub mod config;
pub mod data_api;
pub mod error;
pub mod tracks;
pub mod transcript;
pub mod ytdlp;

use async_trait::async_trait;
use yta_models::VideoInfo;

pub use config::YouTubeConfig;
pub use data_api::YouTubeDataClient;
pub use error::{YouTubeError, YouTubeResult};
pub use transcript::{Transcript, YtDlpTranscriptSource};
pub use ytdlp::{YtDlp, YtDlpCatalog, YtDlpInfo};

/// Source of video metadata.
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    /// Look up a video. `Ok(None)` when the video does not exist.
    async fn video_info(&self, video_id: &str) -> YouTubeResult<Option<VideoInfo>>;
}

/// Source of video transcripts.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch_transcript(&self, video_id: &str) -> YouTubeResult<Transcript>;
}
