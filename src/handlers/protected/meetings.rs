// handlers/protected/meetings.rs - read-only meeting endpoints

use axum::extract::{Path, State};

use crate::database::models::{Meeting, MeetingStats, PropertyTransfer};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/meetings - newest first
pub async fn meeting_list(State(state): State<AppState>) -> ApiResult<Vec<Meeting>> {
    Ok(ApiResponse::success(state.meetings().list().await?))
}

/// GET /api/meetings/:id
pub async fn meeting_get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Meeting> {
    Ok(ApiResponse::success(state.meetings().get(id).await?))
}

/// GET /api/meetings/:id/stats - computed live, not the stored counters
pub async fn meeting_stats(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<MeetingStats> {
    Ok(ApiResponse::success(state.meetings().stats(id).await?))
}

/// GET /api/meetings/:id/transfers
pub async fn meeting_transfers(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<PropertyTransfer>> {
    state.meetings().get(id).await?;
    Ok(ApiResponse::success(state.transfers().for_meeting(id).await?))
}
