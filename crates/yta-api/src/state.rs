//! Application state.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use yta_analysis::{AnalysisConfig, AnalysisPipeline};
use yta_llm::{AnthropicClient, LanguageModel};
use yta_search::{TavilyClient, WebSearch};
use yta_store::{AnalysisStore, MemoryStore, StoreError, SupabaseConfig, SupabaseStore};
use yta_youtube::{
    VideoCatalog, YouTubeConfig, YouTubeDataClient, YtDlp, YtDlpCatalog, YtDlpTranscriptSource,
};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<AnalysisPipeline>,
}

impl AppState {
    pub fn new(config: ApiConfig, pipeline: AnalysisPipeline) -> Self {
        Self {
            config,
            pipeline: Arc::new(pipeline),
        }
    }

    /// Build every client from the environment.
    ///
    /// Optional services degrade instead of failing: without a YouTube API key
    /// metadata comes from yt-dlp, without a Tavily key sources go unverified
    /// and without Supabase settings records live in memory.
    pub fn from_env(config: ApiConfig) -> anyhow::Result<Self> {
        let llm = AnthropicClient::from_env().context("Failed to create Anthropic client")?;
        if !llm.is_configured() {
            warn!("ANTHROPIC_API_KEY is not set; analysis requests will fail");
        }

        let youtube = YouTubeConfig::from_env();
        let catalog: Arc<dyn VideoCatalog> = match youtube.api_key.clone() {
            Some(api_key) => Arc::new(
                YouTubeDataClient::new(api_key, &youtube)
                    .context("Failed to create YouTube Data API client")?,
            ),
            None => {
                warn!("YOUTUBE_API_KEY is not set; reading video metadata with yt-dlp");
                Arc::new(YtDlpCatalog::new(YtDlp::new(youtube.clone())))
            }
        };
        let transcripts = YtDlpTranscriptSource::new(youtube)
            .context("Failed to create transcript source")?;

        let search = TavilyClient::from_env().context("Failed to create Tavily client")?;
        if !search.is_enabled() {
            warn!("TAVILY_API_KEY is not set; cited sources will link to search pages");
        }

        let store: Arc<dyn AnalysisStore> = match SupabaseConfig::from_env() {
            Ok(store_config) => Arc::new(
                SupabaseStore::new(store_config).context("Failed to create Supabase client")?,
            ),
            Err(StoreError::NotConfigured(reason)) => {
                warn!("{}; storing analyses in memory", reason);
                Arc::new(MemoryStore::new())
            }
            Err(e) => return Err(e).context("Invalid Supabase configuration"),
        };
        info!(backend = store.backend(), "Analysis store ready");

        let pipeline = AnalysisPipeline::new(
            Arc::new(llm),
            catalog,
            Arc::new(transcripts),
            Arc::new(search),
            store,
            AnalysisConfig::from_env(),
        );

        Ok(Self::new(config, pipeline))
    }
}
