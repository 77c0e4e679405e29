// handlers/elevated/meetings.rs - meeting administration under /api/admin/meetings

use axum::extract::{Path, State};

use crate::database::models::{ImportBatch, ImportSummary, MailerStatus, Meeting, NewMeeting};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::meeting_service::DeletedMeeting;
use crate::services::snapshot_service::{CaptureResult, ChangeReport};
use crate::state::AppState;

/// POST /api/admin/meetings
pub async fn meeting_create(State(state): State<AppState>, ApiJson(body): ApiJson<NewMeeting>) -> ApiResult<Meeting> {
    body.validate()?;
    Ok(ApiResponse::created(state.meetings().create(body).await?))
}

/// DELETE /api/admin/meetings/:id - meeting plus all of its rows
pub async fn meeting_delete(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<DeletedMeeting> {
    Ok(ApiResponse::success(state.meetings().delete(id).await?))
}

/// PUT /api/admin/meetings/:id/mailers - record the mailer run status
pub async fn meeting_mailers(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<MailerStatus>,
) -> ApiResult<Meeting> {
    Ok(ApiResponse::success(state.meetings().set_mailers_generated(id, body.generated).await?))
}

/// POST /api/admin/meetings/:id/import - upsert a roll batch
pub async fn meeting_import(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<ImportBatch>,
) -> ApiResult<ImportSummary> {
    body.validate()?;
    Ok(ApiResponse::success(state.imports().import(id, body).await?))
}

/// POST /api/admin/meetings/:id/snapshots - 201 when stored, 200 when unchanged
pub async fn snapshot_create(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<CaptureResult> {
    let result = state.snapshots().capture(id).await?;
    if result.created {
        Ok(ApiResponse::created(result))
    } else {
        Ok(ApiResponse::success(result))
    }
}

/// GET /api/admin/meetings/:id/changes - live roll vs latest snapshot
pub async fn meeting_changes(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<ChangeReport> {
    Ok(ApiResponse::success(state.snapshots().changes(id).await?))
}
