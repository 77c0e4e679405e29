// handlers/elevated/schema.rs - POST /api/admin/schema

use axum::extract::State;
use serde::Serialize;

use crate::database::schema::ensure_schema;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaResult {
    pub ensured: Vec<&'static str>,
}

/// Create any missing tables and indexes; safe to repeat
pub async fn schema_post(State(state): State<AppState>, user: AuthUser) -> ApiResult<SchemaResult> {
    let ensured = ensure_schema(state.db.pool()).await?;
    tracing::info!(user_id = %user.user_id, objects = ensured.len(), "Schema ensured");
    Ok(ApiResponse::success(SchemaResult { ensured }))
}
