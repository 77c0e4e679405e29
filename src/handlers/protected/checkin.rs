// handlers/protected/checkin.rs - POST|DELETE /api/shareholders/:shareholder_id/checkin

use axum::{
    body::Bytes,
    extract::{Path, State},
};

use crate::database::models::CheckInRequest;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::checkin_service::CheckInResult;
use crate::services::ProgressEvent;
use crate::state::AppState;

/// POST - check in every property; 409 when already checked in.
/// The body is optional and may carry a signature.
pub async fn checkin_post(
    State(state): State<AppState>,
    Path(shareholder_id): Path<String>,
    body: Bytes,
) -> ApiResult<CheckInResult> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CheckInRequest::default()
    } else {
        serde_json::from_slice::<CheckInRequest>(&body)
            .map_err(|e| ApiError::bad_request(format!("Invalid check-in body: {}", e)))?
    };
    request.validate()?;
    let signature = request.signature.map(|s| s.trim().to_string());

    let result = state.checkins().check_in(&shareholder_id, signature).await?;
    state.progress.publish(ProgressEvent::CheckIn { shareholder_id, checked_in: true });
    Ok(ApiResponse::success(result))
}

/// DELETE - undo check-in (always succeeds for a known shareholder)
pub async fn checkin_delete(
    State(state): State<AppState>,
    Path(shareholder_id): Path<String>,
) -> ApiResult<CheckInResult> {
    let result = state.checkins().undo_check_in(&shareholder_id).await?;
    state.progress.publish(ProgressEvent::CheckIn { shareholder_id, checked_in: false });
    Ok(ApiResponse::success(result))
}
