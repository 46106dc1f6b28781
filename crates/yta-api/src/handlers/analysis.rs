//! Analysis API handlers.
//!
//! The three stages run synchronously within the request:
//! 1. `POST /api/analyze`: transcript summary and suitability
//! 2. `POST /api/analyze/critical`: critical analysis from a perspective
//! 3. `POST /api/analyze/additional`: production planning

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use yta_analysis::AnalyzeOnlyOutput;
use yta_models::{AnalysisRecord, ApiResponse, PerspectiveInfo};

use crate::error::{ApiError, ApiResult};
use crate::security::{is_valid_analysis_id, is_valid_video_id, validate_video_url};
use crate::state::AppState;

/// Reject malformed analysis IDs before they reach the store.
pub(crate) fn check_analysis_id(id: &str) -> ApiResult<()> {
    if is_valid_analysis_id(id) {
        Ok(())
    } else {
        Err(ApiError::bad_request("Invalid analysis ID"))
    }
}

// ============================================================================
// Stage 1
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// YouTube URL to analyze
    pub url: String,
    /// Recompute even when a stored analysis exists
    #[serde(default)]
    pub force: bool,
}

/// Analyze a video, or return its stored analysis.
pub async fn analyze_video(
    State(state): State<AppState>,
    request: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<AnalysisRecord>>> {
    let Json(request) = request?;
    let url = validate_video_url(&request.url)
        .into_result()
        .map_err(ApiError::bad_request)?;

    let analyzed = state.pipeline.analyze_video(&url, request.force).await?;
    info!(
        analysis_id = %analyzed.value.id,
        video_id = %analyzed.value.video_id,
        cached = analyzed.cached,
        "Video analysis served"
    );

    Ok(Json(ApiResponse::ok(analyzed.value).with_cached(analyzed.cached)))
}

/// Stored analysis by ID.
pub async fn get_result(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
) -> ApiResult<Json<ApiResponse<AnalysisRecord>>> {
    check_analysis_id(&analysis_id)?;
    let record = state.pipeline.result(&analysis_id).await?;
    Ok(Json(ApiResponse::ok(record)))
}

// ============================================================================
// Stage 2
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CriticalRequest {
    pub analysis_id: String,
    /// Perspective ID, `auto_trading` when absent
    #[serde(default)]
    pub perspective: Option<String>,
    #[serde(default)]
    pub force: bool,
}

/// Run the critical analysis and return the updated record.
pub async fn analyze_critical(
    State(state): State<AppState>,
    request: Result<Json<CriticalRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<AnalysisRecord>>> {
    let Json(request) = request?;
    check_analysis_id(&request.analysis_id)?;

    let perspective = request
        .perspective
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    let analyzed = state
        .pipeline
        .analyze_critical(&request.analysis_id, perspective, request.force)
        .await?;

    Ok(Json(ApiResponse::ok(analyzed.value).with_cached(analyzed.cached)))
}

/// Available critical-analysis perspectives.
pub async fn list_perspectives(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<PerspectiveInfo>>> {
    Json(ApiResponse::ok(state.pipeline.perspectives()))
}

// ============================================================================
// Stage 3
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AdditionalRequest {
    pub analysis_id: String,
    #[serde(default)]
    pub force: bool,
}

/// Run the additional analysis and return the updated record.
pub async fn analyze_additional(
    State(state): State<AppState>,
    request: Result<Json<AdditionalRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<AnalysisRecord>>> {
    let Json(request) = request?;
    check_analysis_id(&request.analysis_id)?;

    let analyzed = state
        .pipeline
        .analyze_additional(&request.analysis_id, request.force)
        .await?;

    Ok(Json(ApiResponse::ok(analyzed.value).with_cached(analyzed.cached)))
}

// ============================================================================
// Debug
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeOnlyRequest {
    pub url: String,
}

/// Stage 1 without source verification or persistence.
pub async fn analyze_only(
    State(state): State<AppState>,
    request: Result<Json<AnalyzeOnlyRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<AnalyzeOnlyOutput>>> {
    let Json(request) = request?;
    let url = validate_video_url(&request.url)
        .into_result()
        .map_err(ApiError::bad_request)?;
    Ok(Json(ApiResponse::ok(state.pipeline.analyze_only(&url).await?)))
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub video_id: String,
    pub transcript: String,
    pub length: usize,
}

/// Transcript text of a video.
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<Json<ApiResponse<TranscriptResponse>>> {
    if !is_valid_video_id(&video_id) {
        return Err(ApiError::bad_request("Invalid YouTube video ID"));
    }

    let transcript = state.pipeline.transcript(&video_id).await?;
    Ok(Json(ApiResponse::ok(TranscriptResponse {
        length: transcript.char_len(),
        video_id,
        transcript: transcript.text,
    })))
}
