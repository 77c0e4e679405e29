// handlers/elevated/checkins.rs - POST /api/admin/checkins/reset

use axum::extract::State;

use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::checkin_service::ResetResult;
use crate::services::ProgressEvent;
use crate::state::AppState;

/// Clear attendance and signatures for everyone. Designees and comments stay.
pub async fn checkins_reset(State(state): State<AppState>, user: AuthUser) -> ApiResult<ResetResult> {
    let result = state.checkins().uncheck_all().await?;
    tracing::warn!(user_id = %user.user_id, properties = result.properties_reset, "All check-ins reset");
    state.progress.publish(ProgressEvent::CheckInsReset {
        properties: result.properties_reset,
        shareholders: result.signatures_cleared,
    });
    Ok(ApiResponse::success(result))
}
