// handlers/protected/auth.rs - GET /api/auth/whoami handler

use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/whoami - the caller as seen by the token
pub async fn whoami(user: AuthUser) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}
