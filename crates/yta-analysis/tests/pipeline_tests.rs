//! End-to-end pipeline tests against in-memory fakes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use yta_analysis::{AnalysisConfig, AnalysisError, AnalysisPipeline};
use yta_llm::{Completion, CompletionRequest, LanguageModel, LlmError, LlmResult};
use yta_models::VideoInfo;
use yta_search::{SearchHit, SearchResult, WebSearch};
use yta_store::{AnalysisStore, MemoryStore};
use yta_youtube::{Transcript, TranscriptSource, VideoCatalog, YouTubeError, YouTubeResult};

const VIDEO_ID: &str = "dQw4w9WgXcQ";
const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

// =============================================================================
// Fakes
// =============================================================================

/// Replies with a fixed text per request label and counts calls.
#[derive(Default)]
struct ScriptedModel {
    responses: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn respond(&self, label: &str, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(label.to_string(), text.to_string());
    }

    fn calls(&self, label: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|l| *l == label).count()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<Completion> {
        self.calls.lock().unwrap().push(request.label.clone());
        let text = self
            .responses
            .lock()
            .unwrap()
            .get(&request.label)
            .cloned()
            .ok_or(LlmError::EmptyResponse)?;
        Ok(Completion {
            text,
            model: "scripted".to_string(),
            ..Default::default()
        })
    }
}

struct FakeCatalog;

#[async_trait]
impl VideoCatalog for FakeCatalog {
    async fn video_info(&self, video_id: &str) -> YouTubeResult<Option<VideoInfo>> {
        if video_id == VIDEO_ID {
            Ok(Some(VideoInfo::new(video_id, "버핏의 투자 원칙", "투자 채널")))
        } else {
            Ok(None)
        }
    }
}

struct FakeTranscripts;

#[async_trait]
impl TranscriptSource for FakeTranscripts {
    async fn fetch_transcript(&self, video_id: &str) -> YouTubeResult<Transcript> {
        if video_id == VIDEO_ID {
            Ok(Transcript {
                text: "가".repeat(12_000),
                language: "ko".to_string(),
                is_generated: false,
            })
        } else {
            Err(YouTubeError::NoTranscript(video_id.to_string()))
        }
    }
}

/// Search backend without an API key.
struct DisabledSearch;

#[async_trait]
impl WebSearch for DisabledSearch {
    async fn search(&self, _query: &str, _max_results: u32) -> SearchResult<Vec<SearchHit>> {
        Ok(Vec::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

const STAGE_ONE: &str = r#"분석 결과입니다.
```json
{
  "video_analysis": {
    "summary": "버핏의 역발상 투자",
    "key_message": "공포에 사라",
    "key_points": ["역발상", "장기 보유"],
    "quotes": ["남들이 두려워할 때 욕심내라"],
    "people": [{"name": "워렌 버핏", "role": "투자자"}],
    "investment_strategy": "폭락장 분할 매수",
    "source_tracking": [
      {"quote": "남들이 두려워할 때 욕심내라", "source_title": "버크셔 해서웨이 주주서한", "source_type": "주주서한", "source_url": null}
    ]
  },
  "suitability_analysis": {"judgment": "적합", "suitability_score": "4"}
}
```"#;

const CRITICAL: &str = r#"{
  "hidden_premises": [
    {"premise": "충분한 현금", "why_problem": "직장인은 여유 자금이 적다", "source": "달바 보고서", "source_url": null}
  ],
  "hooking_points": [{"point": "버핏도 못 지킨 원칙", "level": "4"}],
  "automation_insight": {"video_type": "가치 투자"}
}"#;

const ADDITIONAL: &str = r#"{
  "title_suggestions": [{"pattern": "권위 뒤집기", "title": "버핏 말만 믿으면 안 되는 이유"}],
  "bonus_tip": {"topic": "적립식 자동이체", "source": "금융감독원"},
  "video_sources": {
    "interview_clips": [{"person": "워렌 버핏", "video_title": "2008 CNBC", "quote": "Be greedy"}]
  }
}"#;

struct Harness {
    model: Arc<ScriptedModel>,
    store: Arc<MemoryStore>,
    pipeline: AnalysisPipeline,
}

fn harness() -> Harness {
    let model = Arc::new(ScriptedModel::default());
    model.respond("video_analysis", STAGE_ONE);
    model.respond("critical_analysis", CRITICAL);
    model.respond("additional_analysis", ADDITIONAL);

    let store = Arc::new(MemoryStore::new());
    let pipeline = AnalysisPipeline::new(
        model.clone(),
        Arc::new(FakeCatalog),
        Arc::new(FakeTranscripts),
        Arc::new(DisabledSearch),
        store.clone(),
        AnalysisConfig::default(),
    );

    Harness {
        model,
        store,
        pipeline,
    }
}

// =============================================================================
// Stage 1
// =============================================================================

#[tokio::test]
async fn test_analyze_video_persists_and_short_circuits() {
    let h = harness();

    let first = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap();
    assert!(!first.cached);
    let record = first.value;
    assert_eq!(record.video_id, VIDEO_ID);
    assert_eq!(record.video_url, VIDEO_URL);
    assert_eq!(record.video_title, "버핏의 투자 원칙");
    assert_eq!(record.analysis.summary, "버핏의 역발상 투자");
    assert_eq!(record.transcript.as_ref().unwrap().chars().count(), 10_000);

    let suitability = record.suitability_analysis.as_ref().unwrap();
    assert_eq!(suitability.suitability_score, 4);
    assert_eq!(suitability.usage_recommendation, "참고만");

    let tracking = &record.analysis.source_tracking[0];
    assert_eq!(tracking.verified, Some(false));
    assert!(tracking
        .source_url
        .as_deref()
        .unwrap()
        .starts_with("https://www.google.com/search?q="));

    let second = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap();
    assert!(second.cached);
    assert_eq!(second.value.id, record.id);
    assert_eq!(h.model.calls("video_analysis"), 1);

    let forced = h.pipeline.analyze_video(VIDEO_URL, true).await.unwrap();
    assert!(!forced.cached);
    assert_ne!(forced.value.id, record.id);
    assert_eq!(h.model.calls("video_analysis"), 2);
    assert_eq!(h.store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_analyze_video_rejects_bad_input() {
    let h = harness();

    let err = h
        .pipeline
        .analyze_video("https://vimeo.com/12345", false)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidUrl(_)));

    let err = h
        .pipeline
        .analyze_video("https://youtu.be/aaaaaaaaaaa", false)
        .await
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Upstream(_)));
    assert_eq!(h.model.calls("video_analysis"), 0);
}

#[tokio::test]
async fn test_analyze_only_does_not_persist() {
    let h = harness();

    let output = h.pipeline.analyze_only(VIDEO_URL).await.unwrap();
    assert_eq!(output.video_id, VIDEO_ID);
    assert_eq!(output.transcript_length, 12_000);
    assert_eq!(output.analysis.video_analysis.key_message, "공포에 사라");
    assert_eq!(h.store.count().await.unwrap(), 0);

    let err = h.pipeline.transcript("not-an-id").await.unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidUrl(_)));
    let transcript = h.pipeline.transcript(VIDEO_ID).await.unwrap();
    assert_eq!(transcript.language, "ko");
}

// =============================================================================
// Stage 2
// =============================================================================

#[tokio::test]
async fn test_critical_analysis_caches_per_perspective() {
    let h = harness();
    let id = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap().value.id;

    let first = h.pipeline.analyze_critical(&id, None, false).await.unwrap();
    assert!(!first.cached);
    assert_eq!(first.value.perspective.as_deref(), Some("auto_trading"));

    let critical = first.value.critical_analysis.unwrap();
    assert_eq!(critical.perspective_name.as_deref(), Some("자동매매 관점"));
    assert_eq!(critical.hooking_points[0].level, Some(4));

    let insight = critical.automation_insight.unwrap();
    assert!(insight.improvement_search_failed);
    assert!(!insight.suggested_search_keywords.is_empty());

    let premise = &critical.hidden_premises[0];
    assert_eq!(premise.verified, Some(false));
    assert_eq!(
        premise.source_url.as_deref(),
        Some("https://www.google.com/search?q=달바+보고서")
    );

    let again = h.pipeline.analyze_critical(&id, Some("auto_trading"), false).await.unwrap();
    assert!(again.cached);
    assert_eq!(h.model.calls("critical_analysis"), 1);

    let other = h.pipeline.analyze_critical(&id, Some("psychology"), false).await.unwrap();
    assert!(!other.cached);
    assert_eq!(other.value.perspective.as_deref(), Some("psychology"));
    assert_eq!(h.model.calls("critical_analysis"), 2);

    let back = h.pipeline.analyze_critical(&id, Some("auto_trading"), false).await.unwrap();
    assert!(back.cached);
    assert_eq!(back.value.perspective.as_deref(), Some("auto_trading"));
    assert_eq!(h.model.calls("critical_analysis"), 2);

    // Switching back to a cached perspective makes it the stored one
    let stored = h.pipeline.result(&id).await.unwrap();
    assert_eq!(stored.perspective, back.value.perspective);
    assert_eq!(stored.critical_analysis, back.value.critical_analysis);

    let additional = h.pipeline.analyze_additional(&id, false).await.unwrap();
    assert!(!additional.cached);
    assert_eq!(additional.value.perspective.as_deref(), Some("auto_trading"));

    let forced = h.pipeline.analyze_critical(&id, Some("auto_trading"), true).await.unwrap();
    assert!(!forced.cached);
    assert_eq!(h.model.calls("critical_analysis"), 3);
}

#[tokio::test]
async fn test_stage_one_cache_reflects_later_stages() {
    let h = harness();
    let id = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap().value.id;
    h.pipeline.analyze_critical(&id, None, false).await.unwrap();

    let cached = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap();
    assert!(cached.cached);
    assert!(cached.value.critical_analysis.is_some());
}

#[tokio::test]
async fn test_critical_analysis_rejects_unsuitable_video() {
    let h = harness();
    h.model.respond(
        "video_analysis",
        r#"{"video_analysis": {"summary": "제품 홍보"}, "suitability_analysis": {"judgment": "부적합", "unsuitable_reason": "광고 영상"}}"#,
    );
    let id = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap().value.id;

    let err = h.pipeline.analyze_critical(&id, None, false).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Unsuitable(ref reason) if reason == "광고 영상"));
    assert_eq!(h.model.calls("critical_analysis"), 0);
}

#[tokio::test]
async fn test_critical_analysis_model_rejection() {
    let h = harness();
    h.model.respond(
        "critical_analysis",
        r#"{"error": true, "message": "투자 전략이 없는 영상입니다"}"#,
    );
    let id = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap().value.id;

    let err = h.pipeline.analyze_critical(&id, None, false).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Rejected(ref m) if m == "투자 전략이 없는 영상입니다"));

    let stored = h.pipeline.result(&id).await.unwrap();
    assert!(stored.critical_analysis.is_none());
}

#[tokio::test]
async fn test_critical_analysis_unknown_id() {
    let h = harness();
    let err = h.pipeline.analyze_critical("missing", None, false).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NotFound(_)));
}

// =============================================================================
// Stage 3
// =============================================================================

#[tokio::test]
async fn test_additional_analysis_requires_critical() {
    let h = harness();
    let id = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap().value.id;

    let err = h.pipeline.analyze_additional(&id, false).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Precondition(_)));
    assert_eq!(h.model.calls("additional_analysis"), 0);
}

#[tokio::test]
async fn test_additional_analysis_verifies_and_caches() {
    let h = harness();
    let id = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap().value.id;
    h.pipeline.analyze_critical(&id, None, false).await.unwrap();

    let first = h.pipeline.analyze_additional(&id, false).await.unwrap();
    assert!(!first.cached);
    let additional = first.value.additional_analysis.unwrap();
    assert_eq!(additional.title_suggestions.len(), 1);

    let clip = &additional.video_sources.interview_clips[0];
    assert_eq!(clip.verified, Some(false));
    assert!(clip
        .link
        .as_deref()
        .unwrap()
        .starts_with("https://www.youtube.com/results?search_query="));
    assert_eq!(additional.bonus_tip.as_ref().unwrap().verified, Some(false));

    let again = h.pipeline.analyze_additional(&id, false).await.unwrap();
    assert!(again.cached);
    assert_eq!(h.model.calls("additional_analysis"), 1);

    let forced = h.pipeline.analyze_additional(&id, true).await.unwrap();
    assert!(!forced.cached);
    assert_eq!(h.model.calls("additional_analysis"), 2);
}

#[tokio::test]
async fn test_new_critical_analysis_discards_additional() {
    let h = harness();
    let id = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap().value.id;
    h.pipeline.analyze_critical(&id, None, false).await.unwrap();
    h.pipeline.analyze_additional(&id, false).await.unwrap();
    assert_eq!(h.model.calls("additional_analysis"), 1);

    let critical = h
        .pipeline
        .analyze_critical(&id, Some("day_trading"), false)
        .await
        .unwrap();
    assert!(critical.value.additional_analysis.is_none());
    assert!(h.store.get(&id).await.unwrap().unwrap().additional_analysis.is_none());

    let rebuilt = h.pipeline.analyze_additional(&id, false).await.unwrap();
    assert!(!rebuilt.cached);
    assert!(rebuilt.value.additional_analysis.is_some());
    assert_eq!(h.model.calls("additional_analysis"), 2);
}

// =============================================================================
// Records and cache
// =============================================================================

#[tokio::test]
async fn test_history_and_delete() {
    let h = harness();
    let id = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap().value.id;

    let page = h.pipeline.history(20, 0).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, id);

    assert_eq!(h.pipeline.cache_stats().await.video_ids, vec![VIDEO_ID.to_string()]);

    h.pipeline.delete(&id).await.unwrap();
    assert!(matches!(
        h.pipeline.result(&id).await.unwrap_err(),
        AnalysisError::NotFound(_)
    ));
    assert!(h.pipeline.cache_stats().await.video_ids.is_empty());
    assert!(matches!(
        h.pipeline.delete(&id).await.unwrap_err(),
        AnalysisError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_clear_cache_forces_store_lookup() {
    let h = harness();
    h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap();
    h.pipeline.clear_cache(None).await;
    assert_eq!(h.pipeline.cache_stats().await.total_entries, 0);

    let again = h.pipeline.analyze_video(VIDEO_URL, false).await.unwrap();
    assert!(again.cached);
    assert_eq!(h.model.calls("video_analysis"), 1);
    assert_eq!(h.pipeline.cache_stats().await.total_entries, 1);
}

#[test]
fn test_perspectives_listing() {
    let h = harness();
    let perspectives = h.pipeline.perspectives();
    assert_eq!(perspectives.len(), 4);
    assert_eq!(perspectives[0].id, "auto_trading");
}
