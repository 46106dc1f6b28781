//! Stage cache inspection.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use yta_analysis::CacheStats;
use yta_models::ApiResponse;

use super::MessageResponse;
use crate::error::{ApiError, ApiResult};
use crate::security::is_valid_video_id;
use crate::state::AppState;

pub async fn cache_stats(State(state): State<AppState>) -> Json<ApiResponse<CacheStats>> {
    Json(ApiResponse::ok(state.pipeline.cache_stats().await))
}

#[derive(Debug, Deserialize)]
pub struct ClearCacheQuery {
    pub video_id: Option<String>,
}

/// Clear one video's cached stages, or the whole cache.
pub async fn clear_cache(
    State(state): State<AppState>,
    query: Result<Query<ClearCacheQuery>, QueryRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Query(query) = query?;
    match query.video_id.as_deref() {
        Some(video_id) if !is_valid_video_id(video_id) => {
            Err(ApiError::bad_request("Invalid YouTube video ID"))
        }
        Some(video_id) => {
            state.pipeline.clear_cache(Some(video_id)).await;
            info!(video_id, "Cleared cached stages");
            Ok(Json(MessageResponse::ok(format!("Cache cleared for {}", video_id))))
        }
        None => {
            state.pipeline.clear_cache(None).await;
            info!("Cleared analysis cache");
            Ok(Json(MessageResponse::ok("Cache cleared")))
        }
    }
}
