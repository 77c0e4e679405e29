// handlers/protected/progress.rs - GET /api/progress (server-sent events)

use std::convert::Infallible;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::BoxStream;

use crate::middleware::AuthUser;
use crate::state::AppState;

/// Streams import, check-in, and reset notifications until the client disconnects
pub async fn progress_stream(
    State(state): State<AppState>,
    user: AuthUser,
) -> Sse<BoxStream<'static, Result<Event, Infallible>>> {
    tracing::debug!(user_id = %user.user_id, "Opening progress stream");
    Sse::new(state.progress.sse_stream()).keep_alive(KeepAlive::default())
}
