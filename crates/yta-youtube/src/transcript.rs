//! Transcript retrieval through yt-dlp caption tracks.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::captions::{parse_json3, parse_vtt};
use crate::config::YouTubeConfig;
use crate::error::{YouTubeError, YouTubeResult};
use crate::tracks::{select_track, CaptionKind};
use crate::ytdlp::{YtDlp, YtDlpInfo};
use crate::TranscriptSource;

/// Plain caption text for a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub text: String,
    pub language: String,
    pub is_generated: bool,
}

impl Transcript {
    /// Length in characters, not bytes.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

pub struct YtDlpTranscriptSource {
    ytdlp: YtDlp,
    http: Client,
}

impl YtDlpTranscriptSource {
    pub fn new(config: YouTubeConfig) -> YouTubeResult<Self> {
        let mut builder = Client::builder().timeout(config.http_timeout);
        if let Some(proxy) = &config.proxy_url {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let http = builder.build()?;

        Ok(Self {
            ytdlp: YtDlp::new(config),
            http,
        })
    }

    /// Select, download and parse a caption track from probed video info.
    pub async fn transcript_from_info(
        &self,
        video_id: &str,
        info: &YtDlpInfo,
    ) -> YouTubeResult<Transcript> {
        let languages = &self.ytdlp.config().transcript_languages;
        let Some(track) = select_track(info, languages) else {
            warn!(video_id, "No caption tracks available");
            return Err(YouTubeError::NoTranscript(video_id.to_string()));
        };

        info!(
            video_id,
            language = %track.language,
            generated = track.is_generated,
            format = ?track.kind,
            "Downloading caption track"
        );

        let response = self.http.get(&track.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(YouTubeError::download(format!(
                "caption request returned {}",
                status
            )));
        }
        let body = response.text().await?;

        let text = match track.kind {
            CaptionKind::Vtt => parse_vtt(&body),
            CaptionKind::Json3 => parse_json3(&body)?,
        };
        if text.trim().is_empty() {
            return Err(YouTubeError::EmptyTranscript(video_id.to_string()));
        }

        Ok(Transcript {
            text,
            language: track.language,
            is_generated: track.is_generated,
        })
    }
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    async fn fetch_transcript(&self, video_id: &str) -> YouTubeResult<Transcript> {
        let info = self.ytdlp.probe(video_id).await?;
        let transcript = self.transcript_from_info(video_id, &info).await?;
        info!(
            video_id,
            chars = transcript.char_len(),
            "Transcript fetched"
        );
        Ok(transcript)
    }
}
