// handlers/elevated/users.rs - operator accounts held by the identity provider

use axum::{
    extract::{Path, State},
    http::StatusCode,
};

use crate::middleware::{ApiJson, ApiResponse, ApiResult, AuthUser};
use crate::services::identity_service::{ManagedUser, NewUser, RoleUpdate};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn user_list(State(state): State<AppState>) -> ApiResult<Vec<ManagedUser>> {
    Ok(ApiResponse::success(state.identity.list_users().await?))
}

/// POST /api/admin/users
pub async fn user_create(State(state): State<AppState>, ApiJson(body): ApiJson<NewUser>) -> ApiResult<ManagedUser> {
    let role = body.validate()?;
    Ok(ApiResponse::created(state.identity.create_user(&body, role).await?))
}

/// PUT /api/admin/users/:id/role
pub async fn user_role(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(body): ApiJson<RoleUpdate>,
) -> ApiResult<ManagedUser> {
    let role = body.validate()?;
    Ok(ApiResponse::success(state.identity.update_role(&user_id, role).await?))
}

/// DELETE /api/admin/users/:id - 204; an admin cannot delete themselves
pub async fn user_delete(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    caller: AuthUser,
) -> ApiResult<()> {
    if caller.user_id == user_id {
        return Err(crate::error::ApiError::bad_request("Cannot delete your own account"));
    }
    state.identity.delete_user(&user_id).await?;
    Ok(ApiResponse::with_status((), StatusCode::NO_CONTENT))
}
