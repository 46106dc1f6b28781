//! The three-stage analysis pipeline.
//!
//! 1. Video analysis: transcript → summary, quotes, sources, suitability
//! 2. Critical analysis: stage 1 → hidden premises, contradictions, hooks
//! 3. Additional analysis: stages 1 + 2 → titles, thumbnails, script, sources
//!
//! Each stage short-circuits to a cached or stored result unless forced, and
//! runs source verification on its output before persisting.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use yta_llm::{extract_json, CompletionRequest, LanguageModel};
use yta_models::{
    extract_youtube_id, is_valid_youtube_id, lenient, AnalysisPatch, AnalysisRecord, HistoryItem,
    NewAnalysis, PerspectiveInfo, StageOneOutput, SuitabilityAnalysis, VideoAnalysis,
};
use yta_search::{SearchHit, SourceVerifier, WebSearch};
use yta_store::AnalysisStore;
use yta_youtube::{Transcript, TranscriptSource, VideoCatalog};

use crate::cache::{AnalysisCache, CacheStats, CachedStage, StageKey};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::logging::StageLogger;
use crate::metrics;
use crate::perspectives::{all_perspectives, get_perspective, Perspective, DEFAULT_PERSPECTIVE};
use crate::prompts::additional::build_additional_prompt;
use crate::prompts::critical::build_critical_prompt;
use crate::prompts::truncate_chars;
use crate::prompts::video::build_video_prompt;
use crate::verification::{verify_additional, verify_critical, verify_source_tracking};

pub const STAGE_VIDEO: &str = "video_analysis";
pub const STAGE_CRITICAL: &str = "critical_analysis";
pub const STAGE_ADDITIONAL: &str = "additional_analysis";

/// Improvement-case searches per critical analysis.
const MAX_IMPROVEMENT_QUERIES: usize = 2;
const IMPROVEMENT_HITS_PER_QUERY: u32 = 3;
const MAX_IMPROVEMENT_HITS: usize = 5;

const ANALYSIS_NOT_FOUND: &str = "Analysis result not found";
const DEFAULT_UNSUITABLE_REASON: &str = "unsuitable subject matter";
const DEFAULT_REJECTION: &str = "Critical analysis could not be performed";

/// A stage result and whether it was served without running the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Analyzed<T> {
    pub value: T,
    pub cached: bool,
}

impl<T> Analyzed<T> {
    fn fresh(value: T) -> Self {
        Self { value, cached: false }
    }

    fn cached(value: T) -> Self {
        Self { value, cached: true }
    }
}

/// Stage 1 output as returned by the model, after normalisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoStageResult {
    pub video_analysis: VideoAnalysis,
    pub suitability_analysis: SuitabilityAnalysis,
}

/// Stage 1 run without persistence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeOnlyOutput {
    pub video_id: String,
    pub transcript_length: usize,
    pub analysis: VideoStageResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryPage {
    pub items: Vec<HistoryItem>,
    pub total: u64,
}

pub struct AnalysisPipeline {
    llm: Arc<dyn LanguageModel>,
    catalog: Arc<dyn VideoCatalog>,
    transcripts: Arc<dyn TranscriptSource>,
    search: Arc<dyn WebSearch>,
    store: Arc<dyn AnalysisStore>,
    cache: AnalysisCache,
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(
        llm: Arc<dyn LanguageModel>,
        catalog: Arc<dyn VideoCatalog>,
        transcripts: Arc<dyn TranscriptSource>,
        search: Arc<dyn WebSearch>,
        store: Arc<dyn AnalysisStore>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            llm,
            catalog,
            transcripts,
            search,
            store,
            cache: AnalysisCache::new(config.cache_ttl, config.cache_max_videos),
            config,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    // =========================================================================
    // Stage 1
    // =========================================================================

    /// Analyze a video by URL and persist the result.
    ///
    /// Without `force`, an existing analysis with a summary is returned as-is.
    pub async fn analyze_video(&self, url: &str, force: bool) -> AnalysisResult<Analyzed<AnalysisRecord>> {
        let video_id = extract_youtube_id(url)?;
        let logger = StageLogger::new(STAGE_VIDEO, &video_id);
        let started = Instant::now();

        if !force {
            if let Some(record) = self.existing_video_analysis(&video_id).await? {
                logger.log_completion("served existing analysis");
                metrics::record_stage(STAGE_VIDEO, "cached", elapsed_ms(started));
                return Ok(Analyzed::cached(record));
            }
        }

        let result = self
            .run_video_analysis(url, &video_id, &logger)
            .instrument(logger.create_span())
            .await;
        finish(&logger, started, result).map(Analyzed::fresh)
    }

    async fn existing_video_analysis(&self, video_id: &str) -> AnalysisResult<Option<AnalysisRecord>> {
        if let Some(CachedStage::Video(record)) = self.cache.get(video_id, &StageKey::Video).await {
            return Ok(Some(*record));
        }

        let stored = self
            .store
            .find_by_video_id(video_id)
            .await?
            .filter(AnalysisRecord::has_summary);
        if let Some(record) = &stored {
            self.cache_record(record).await;
        }
        Ok(stored)
    }

    async fn run_video_analysis(
        &self,
        url: &str,
        video_id: &str,
        logger: &StageLogger,
    ) -> AnalysisResult<AnalysisRecord> {
        logger.log_start(url);

        let info = self.catalog.video_info(video_id).await?.ok_or_else(|| {
            AnalysisError::upstream(format!("Could not fetch video information for {}", video_id))
        })?;
        let transcript = self.transcripts.fetch_transcript(video_id).await?;
        logger.log_progress(&format!(
            "transcript fetched ({} chars, language {})",
            transcript.char_len(),
            transcript.language
        ));

        let mut stage = self.video_stage(&transcript.text).await?;

        let verifier = SourceVerifier::new(self.search.clone());
        verify_source_tracking(&verifier, &mut stage.video_analysis.source_tracking).await;

        let (stored_transcript, _) =
            truncate_chars(&transcript.text, self.config.stored_transcript_max_chars);
        let record = self
            .store
            .insert(NewAnalysis {
                video_id: video_id.to_string(),
                video_title: info.title,
                video_url: url.to_string(),
                channel_name: info.channel_name,
                thumbnail_url: info.thumbnail_url,
                transcript: Some(stored_transcript.to_string()),
                analysis: stage.video_analysis,
                suitability_analysis: Some(stage.suitability_analysis),
            })
            .await?;

        // Later stages cached for an older record of this video no longer apply
        self.cache.clear_video(video_id).await;
        self.cache_record(&record).await;

        logger.log_completion(&format!("stored analysis {}", record.id));
        Ok(record)
    }

    async fn video_stage(&self, transcript: &str) -> AnalysisResult<VideoStageResult> {
        let prompt = build_video_prompt(transcript, self.config.transcript_max_chars);
        let value = self
            .complete_json(STAGE_VIDEO, prompt, self.config.video_max_tokens)
            .await?;
        let output = StageOneOutput::from_model_value(value)
            .map_err(|e| parse_error(STAGE_VIDEO, e))?;

        Ok(VideoStageResult {
            video_analysis: output.video_analysis,
            suitability_analysis: output.suitability_analysis.unwrap_or_default().normalize(),
        })
    }

    /// Run stage 1 without verification or persistence.
    pub async fn analyze_only(&self, url: &str) -> AnalysisResult<AnalyzeOnlyOutput> {
        let video_id = extract_youtube_id(url)?;
        let transcript = self.transcripts.fetch_transcript(&video_id).await?;
        let analysis = self.video_stage(&transcript.text).await?;

        Ok(AnalyzeOnlyOutput {
            video_id,
            transcript_length: transcript.char_len(),
            analysis,
        })
    }

    pub async fn transcript(&self, video_id: &str) -> AnalysisResult<Transcript> {
        if !is_valid_youtube_id(video_id) {
            return Err(AnalysisError::invalid_url(format!("Invalid video ID: {}", video_id)));
        }
        Ok(self.transcripts.fetch_transcript(video_id).await?)
    }

    // =========================================================================
    // Stage 2
    // =========================================================================

    /// Critical analysis of a stored stage 1 result from one perspective.
    ///
    /// Unknown perspectives resolve to the default. Videos judged unsuitable
    /// are rejected.
    pub async fn analyze_critical(
        &self,
        analysis_id: &str,
        perspective: Option<&str>,
        force: bool,
    ) -> AnalysisResult<Analyzed<AnalysisRecord>> {
        let perspective = get_perspective(perspective.unwrap_or(DEFAULT_PERSPECTIVE));
        let logger = StageLogger::new(STAGE_CRITICAL, analysis_id);
        let started = Instant::now();

        let mut record = self.load(analysis_id).await?;

        if let Some(suitability) = record.suitability_analysis.as_ref() {
            if suitability.is_unsuitable() {
                let reason = suitability
                    .unsuitable_reason
                    .clone()
                    .filter(|r| !r.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_UNSUITABLE_REASON.to_string());
                logger.log_warning(&format!("rejected as unsuitable: {}", reason));
                return Err(AnalysisError::Unsuitable(reason));
            }
        }

        let key = StageKey::Critical(perspective.id.to_string());
        if !force {
            let cached = self.cache.get(&record.video_id, &key).await;
            if let Some(CachedStage::Critical(critical)) = cached {
                let record = if record.perspective.as_deref() == Some(perspective.id) {
                    record.critical_analysis = Some(*critical);
                    record
                } else {
                    self.save_critical(&record, perspective, *critical).await?
                };
                metrics::record_stage(STAGE_CRITICAL, "cached", elapsed_ms(started));
                return Ok(Analyzed::cached(record));
            }
            if record.perspective.as_deref() == Some(perspective.id) {
                if let Some(critical) = record.critical_analysis.clone() {
                    self.cache
                        .insert(&record.video_id, key, CachedStage::Critical(Box::new(critical)))
                        .await;
                    metrics::record_stage(STAGE_CRITICAL, "cached", elapsed_ms(started));
                    return Ok(Analyzed::cached(record));
                }
            }
        }

        let result = self
            .run_critical_analysis(record, perspective, &logger)
            .instrument(logger.create_span())
            .await;
        finish(&logger, started, result).map(Analyzed::fresh)
    }

    async fn run_critical_analysis(
        &self,
        record: AnalysisRecord,
        perspective: &'static Perspective,
        logger: &StageLogger,
    ) -> AnalysisResult<AnalysisRecord> {
        logger.log_start(perspective.id);
        let verifier = SourceVerifier::new(self.search.clone());

        let queries = improvement_queries(&record.analysis, perspective);
        let hits = improvement_hits(&verifier, &queries).await;
        if hits.is_empty() {
            logger.log_warning("no improvement cases found by web search");
        }

        let prompt = build_critical_prompt(
            perspective,
            &record.analysis,
            record.suitability_analysis.as_ref(),
            &hits,
        );
        let value = self
            .complete_json(STAGE_CRITICAL, prompt, self.config.critical_max_tokens)
            .await?;
        check_rejection(&value)?;

        let mut critical: yta_models::CriticalAnalysis =
            lenient::from_model_value(value).map_err(|e| parse_error(STAGE_CRITICAL, e))?;
        critical.perspective_name = Some(perspective.name.to_string());
        if hits.is_empty() {
            let insight = critical.automation_insight.get_or_insert_with(Default::default);
            insight.improvement_search_failed = true;
            if insight.suggested_search_keywords.is_empty() {
                insight.suggested_search_keywords = queries;
            }
        }

        verify_critical(&verifier, &mut critical).await;

        let updated = self.save_critical(&record, perspective, critical.clone()).await?;
        self.cache
            .insert(
                &updated.video_id,
                StageKey::Critical(perspective.id.to_string()),
                CachedStage::Critical(Box::new(critical)),
            )
            .await;

        logger.log_completion(perspective.name);
        Ok(updated)
    }

    /// Persist a stage 2 result as the record's current perspective.
    ///
    /// The stored stage 3 result is cleared along with its cache entry.
    async fn save_critical(
        &self,
        record: &AnalysisRecord,
        perspective: &'static Perspective,
        critical: yta_models::CriticalAnalysis,
    ) -> AnalysisResult<AnalysisRecord> {
        let updated = self
            .store
            .update(&record.id, AnalysisPatch::critical(perspective.id, critical))
            .await?
            .ok_or_else(|| AnalysisError::not_found(ANALYSIS_NOT_FOUND))?;

        self.cache
            .remove(&updated.video_id, &StageKey::Additional)
            .await;
        self.cache_record(&updated).await;
        Ok(updated)
    }

    // =========================================================================
    // Stage 3
    // =========================================================================

    /// Production planning from stored stage 1 and stage 2 results.
    pub async fn analyze_additional(
        &self,
        analysis_id: &str,
        force: bool,
    ) -> AnalysisResult<Analyzed<AnalysisRecord>> {
        let logger = StageLogger::new(STAGE_ADDITIONAL, analysis_id);
        let started = Instant::now();

        let mut record = self.load(analysis_id).await?;
        if record.critical_analysis.is_none() {
            return Err(AnalysisError::precondition(
                "Run the critical analysis before the additional analysis",
            ));
        }

        if !force {
            let cached = self.cache.get(&record.video_id, &StageKey::Additional).await;
            if let Some(CachedStage::Additional(additional)) = cached {
                record.additional_analysis = Some(*additional);
                metrics::record_stage(STAGE_ADDITIONAL, "cached", elapsed_ms(started));
                return Ok(Analyzed::cached(record));
            }
            if let Some(additional) = record.additional_analysis.clone() {
                self.cache
                    .insert(
                        &record.video_id,
                        StageKey::Additional,
                        CachedStage::Additional(Box::new(additional)),
                    )
                    .await;
                metrics::record_stage(STAGE_ADDITIONAL, "cached", elapsed_ms(started));
                return Ok(Analyzed::cached(record));
            }
        }

        let result = self
            .run_additional_analysis(record, &logger)
            .instrument(logger.create_span())
            .await;
        finish(&logger, started, result).map(Analyzed::fresh)
    }

    async fn run_additional_analysis(
        &self,
        record: AnalysisRecord,
        logger: &StageLogger,
    ) -> AnalysisResult<AnalysisRecord> {
        logger.log_start(&record.video_id);
        let critical = record
            .critical_analysis
            .as_ref()
            .ok_or_else(|| AnalysisError::precondition("Critical analysis missing"))?;

        let prompt = build_additional_prompt(
            &record.analysis,
            record.suitability_analysis.as_ref(),
            critical,
        );
        let value = self
            .complete_json(STAGE_ADDITIONAL, prompt, self.config.additional_max_tokens)
            .await?;
        let mut additional: yta_models::AdditionalAnalysis =
            lenient::from_model_value(value).map_err(|e| parse_error(STAGE_ADDITIONAL, e))?;

        let verifier = SourceVerifier::new(self.search.clone());
        verify_additional(&verifier, &mut additional).await;

        let updated = self
            .store
            .update(&record.id, AnalysisPatch::additional(additional.clone()))
            .await?
            .ok_or_else(|| AnalysisError::not_found(ANALYSIS_NOT_FOUND))?;

        self.cache
            .insert(
                &updated.video_id,
                StageKey::Additional,
                CachedStage::Additional(Box::new(additional)),
            )
            .await;
        self.cache_record(&updated).await;

        logger.log_completion(&updated.id);
        Ok(updated)
    }

    // =========================================================================
    // Records, history and cache
    // =========================================================================

    pub async fn result(&self, analysis_id: &str) -> AnalysisResult<AnalysisRecord> {
        self.load(analysis_id).await
    }

    pub async fn history(&self, limit: u32, offset: u32) -> AnalysisResult<HistoryPage> {
        let items = self.store.history(limit, offset).await?;
        let total = self.store.count().await?;
        Ok(HistoryPage { items, total })
    }

    /// Delete a stored analysis and drop its video's cached stages.
    pub async fn delete(&self, analysis_id: &str) -> AnalysisResult<()> {
        let record = self.load(analysis_id).await?;
        if !self.store.delete(analysis_id).await? {
            return Err(AnalysisError::not_found(ANALYSIS_NOT_FOUND));
        }
        self.cache.clear_video(&record.video_id).await;
        tracing::info!(analysis_id, video_id = %record.video_id, "Deleted analysis");
        Ok(())
    }

    pub fn perspectives(&self) -> Vec<PerspectiveInfo> {
        all_perspectives()
    }

    pub async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    /// Clear one video's cached stages, or everything when `video_id` is `None`.
    pub async fn clear_cache(&self, video_id: Option<&str>) {
        match video_id {
            Some(video_id) => self.cache.clear_video(video_id).await,
            None => self.cache.clear_all().await,
        }
    }

    /// Store reachability for readiness probes.
    pub async fn check_store(&self) -> AnalysisResult<()> {
        Ok(self.store.ping().await?)
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn llm_configured(&self) -> bool {
        self.llm.is_configured()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn load(&self, analysis_id: &str) -> AnalysisResult<AnalysisRecord> {
        self.store
            .get(analysis_id)
            .await?
            .ok_or_else(|| AnalysisError::not_found(ANALYSIS_NOT_FOUND))
    }

    async fn cache_record(&self, record: &AnalysisRecord) {
        self.cache
            .insert(
                &record.video_id,
                StageKey::Video,
                CachedStage::Video(Box::new(record.clone())),
            )
            .await;
    }

    async fn complete_json(&self, stage: &str, prompt: String, max_tokens: u32) -> AnalysisResult<Value> {
        let request = CompletionRequest::new(stage, prompt).with_max_tokens(max_tokens);
        let completion = self.llm.complete(request).await?;
        if completion.is_truncated() {
            tracing::warn!(
                stage,
                model = %completion.model,
                output_tokens = completion.output_tokens,
                "Model output hit the token limit"
            );
        }
        Ok(extract_json(&completion.text)?)
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Record the outcome of a stage run.
fn finish<T>(logger: &StageLogger, started: Instant, result: AnalysisResult<T>) -> AnalysisResult<T> {
    match &result {
        Ok(_) => metrics::record_stage(logger.stage(), "success", elapsed_ms(started)),
        Err(e) => {
            logger.log_error(&e.to_string());
            metrics::record_stage(logger.stage(), "error", elapsed_ms(started));
        }
    }
    result
}

fn parse_error(stage: &str, e: serde_json::Error) -> AnalysisError {
    AnalysisError::upstream(format!("Failed to parse {} result: {}", stage, e))
}

/// A model response of `{"error": true, "message": ...}` declines the task.
fn check_rejection(value: &Value) -> AnalysisResult<()> {
    if value.get("error").and_then(Value::as_bool) != Some(true) {
        return Ok(());
    }
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_REJECTION);
    Err(AnalysisError::rejected(message))
}

/// Web queries for documented improvements on the video's strategy.
fn improvement_queries(analysis: &VideoAnalysis, perspective: &Perspective) -> Vec<String> {
    let topic = [
        analysis.investment_strategy.as_str(),
        analysis.key_message.as_str(),
        analysis.summary.as_str(),
    ]
    .into_iter()
    .map(str::trim)
    .find(|s| !s.is_empty())
    .map(|s| truncate_chars(s, 40).0.to_string());

    let mut queries = Vec::new();
    if let Some(topic) = topic {
        queries.push(format!("{} 전략 한계 보완 사례 백테스트", topic));
    }
    queries.push(format!(
        "{} 투자 전략 정량화 검증 수익률",
        perspective.name.trim_end_matches(" 관점")
    ));
    queries.truncate(MAX_IMPROVEMENT_QUERIES);
    queries
}

/// Search each query, dropping duplicate URLs, up to [`MAX_IMPROVEMENT_HITS`].
async fn improvement_hits(verifier: &SourceVerifier, queries: &[String]) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = Vec::new();
    for query in queries {
        for hit in verifier.search_hits(query, IMPROVEMENT_HITS_PER_QUERY).await {
            if !hits.iter().any(|h| h.url == hit.url) {
                hits.push(hit);
            }
        }
    }
    hits.truncate(MAX_IMPROVEMENT_HITS);
    hits
}
