use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};

pub use crate::auth::AuthUser;
use crate::auth::{bearer_token, TokenError};
use crate::error::ApiError;
use crate::state::AppState;

/// Verify the bearer token and attach the caller to the request
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let header = match request.headers().get(AUTHORIZATION) {
        Some(value) => value,
        None => return ApiError::unauthorized("Missing Authorization header").into_response(),
    };

    let header = match header.to_str() {
        Ok(h) => h,
        Err(_) => return ApiError::unauthorized("Invalid Authorization header format").into_response(),
    };

    let token = match bearer_token(header) {
        Ok(t) => t,
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    };

    match state.tokens.verify(token) {
        Ok(user) => {
            tracing::debug!(user_id = %user.user_id, role = %user.role, "Authenticated request");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(TokenError::NotConfigured) => {
            tracing::warn!("Rejecting request: SECURITY_JWT_SECRET is not set");
            ApiError::unauthorized("Authentication is not configured").into_response()
        }
        Err(e) => {
            tracing::debug!("Token rejected: {}", e);
            ApiError::unauthorized(e.to_string()).into_response()
        }
    }
}

/// Must run inside `require_auth`
pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin => next.run(request).await,
        Some(user) => {
            tracing::warn!(user_id = %user.user_id, role = %user.role, "Admin route refused");
            ApiError::forbidden("Admin role required").into_response()
        }
        None => ApiError::unauthorized("Authentication required").into_response(),
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
