//! In-memory fakes and request helpers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use yta_analysis::{AnalysisConfig, AnalysisPipeline};
use yta_api::{create_router, ApiConfig, AppState};
use yta_llm::{Completion, CompletionRequest, LanguageModel, LlmError, LlmResult};
use yta_models::VideoInfo;
use yta_search::{SearchHit, SearchResult, WebSearch};
use yta_store::MemoryStore;
use yta_youtube::{Transcript, TranscriptSource, VideoCatalog, YouTubeError, YouTubeResult};

pub const VIDEO_ID: &str = "dQw4w9WgXcQ";
pub const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
pub const TRANSCRIPT: &str = "오늘은 워렌 버핏의 투자 원칙을 이야기해 보겠습니다";

pub const STAGE_ONE: &str = r#"{
  "video_analysis": {
    "summary": "버핏의 역발상 투자",
    "key_message": "공포에 사라",
    "key_points": ["역발상"],
    "quotes": [{"text": "남들이 두려워할 때 욕심내라", "speaker": "워렌 버핏"}],
    "investment_strategy": "폭락장 분할 매수"
  },
  "suitability_analysis": {"judgment": "적합", "suitability_score": 4}
}"#;

pub const UNSUITABLE_STAGE_ONE: &str = r#"{
  "video_analysis": {"summary": "제품 홍보"},
  "suitability_analysis": {"judgment": "부적합", "unsuitable_reason": "광고 영상"}
}"#;

pub const CRITICAL: &str = r#"{
  "hidden_premises": [{"premise": "충분한 현금", "why_problem": "여유 자금 부족"}],
  "automation_insight": {"video_type": "가치 투자"}
}"#;

pub const ADDITIONAL: &str = r#"{
  "title_suggestions": [{"pattern": "권위 뒤집기", "title": "버핏 말만 믿으면 안 되는 이유"}]
}"#;

/// Replies with a fixed text per request label.
#[derive(Default)]
pub struct ScriptedModel {
    responses: Mutex<HashMap<String, String>>,
}

impl ScriptedModel {
    pub fn respond(&self, label: &str, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(label.to_string(), text.to_string());
    }

    pub fn forget(&self, label: &str) {
        self.responses.lock().unwrap().remove(label);
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> LlmResult<Completion> {
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

pub struct FakeYouTube;

#[async_trait]
impl VideoCatalog for FakeYouTube {
    async fn video_info(&self, video_id: &str) -> YouTubeResult<Option<VideoInfo>> {
        Ok((video_id == VIDEO_ID).then(|| VideoInfo::new(video_id, "버핏의 투자 원칙", "투자 채널")))
    }
}

#[async_trait]
impl TranscriptSource for FakeYouTube {
    async fn fetch_transcript(&self, video_id: &str) -> YouTubeResult<Transcript> {
        if video_id != VIDEO_ID {
            return Err(YouTubeError::NoTranscript(video_id.to_string()));
        }
        Ok(Transcript {
            text: TRANSCRIPT.to_string(),
            language: "ko".to_string(),
            is_generated: true,
        })
    }
}

pub struct NoSearch;

#[async_trait]
impl WebSearch for NoSearch {
    async fn search(&self, _query: &str, _max_results: u32) -> SearchResult<Vec<SearchHit>> {
        Ok(Vec::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

pub struct TestApp {
    pub router: Router,
    pub model: Arc<ScriptedModel>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ApiConfig::default())
    }

    pub fn with_config(config: ApiConfig) -> Self {
        let model = Arc::new(ScriptedModel::default());
        model.respond("video_analysis", STAGE_ONE);
        model.respond("critical_analysis", CRITICAL);
        model.respond("additional_analysis", ADDITIONAL);

        let pipeline = AnalysisPipeline::new(
            model.clone(),
            Arc::new(FakeYouTube),
            Arc::new(FakeYouTube),
            Arc::new(NoSearch),
            Arc::new(MemoryStore::new()),
            AnalysisConfig::default(),
        );
        let router = create_router(AppState::new(config, pipeline), None);

        Self { router, model }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request(uri, body, None)).await
    }

    /// Run stage 1 for the test video and return the analysis ID.
    pub async fn analyze(&self) -> String {
        let (status, body) = self
            .post("/api/analyze", serde_json::json!({ "url": VIDEO_URL }))
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }
}

pub fn json_request(uri: &str, body: Value, client_ip: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header("content-type", "application/json");
    if let Some(ip) = client_ip {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
