// handlers/elevated/progress.rs - GET /api/admin/progress/connections

use axum::extract::State;
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::progress::ConnectionInfo;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressConnections {
    pub count: usize,
    pub connections: Vec<ConnectionInfo>,
}

/// Open progress streams, oldest first
pub async fn progress_connections(State(state): State<AppState>) -> ApiResult<ProgressConnections> {
    let connections = state.progress.connections();
    Ok(ApiResponse::success(ProgressConnections { count: connections.len(), connections }))
}
