//! History listing and deletion.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use yta_models::{ApiResponse, HistoryItem};

use super::analysis::check_analysis_id;
use super::MessageResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: u32 = 20;
const MAX_HISTORY_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Newest analyses first, with the total row count.
pub async fn list_history(
    State(state): State<AppState>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<Vec<HistoryItem>>>> {
    let Query(query) = query?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(ApiError::bad_request(format!(
            "limit must be between 1 and {}",
            MAX_HISTORY_LIMIT
        )));
    }

    let page = state
        .pipeline
        .history(limit, query.offset.unwrap_or(0))
        .await?;

    Ok(Json(ApiResponse::ok(page.items).with_total(page.total)))
}

pub async fn delete_history(
    State(state): State<AppState>,
    Path(analysis_id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    check_analysis_id(&analysis_id)?;
    state.pipeline.delete(&analysis_id).await?;
    Ok(Json(MessageResponse::ok("Analysis deleted")))
}
