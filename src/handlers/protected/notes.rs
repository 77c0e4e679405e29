// handlers/protected/notes.rs - designee and comment on a shareholder
//
// GET|PUT|DELETE /api/shareholders/:shareholder_id/designee
// GET|PUT|DELETE /api/shareholders/:shareholder_id/comment

use axum::extract::{Path, State};
use serde_json::{Map, Value};

use crate::database::models::{CommentRequest, DesigneeRequest};
use crate::middleware::{ApiJson, ApiResponse, ApiResult};
use crate::services::Note;
use crate::state::AppState;

fn note_body(shareholder_id: &str, note: Note, value: Option<String>) -> Value {
    let field = match note {
        Note::Designee => "designee",
        Note::Comment => "comment",
    };
    let mut body = Map::new();
    body.insert("shareholderId".to_string(), Value::from(shareholder_id));
    body.insert(field.to_string(), value.map(Value::from).unwrap_or(Value::Null));
    Value::Object(body)
}

async fn read(state: &AppState, shareholder_id: String, note: Note) -> ApiResult<Value> {
    let value = state.shareholders().get_note(&shareholder_id, note).await?;
    Ok(ApiResponse::success(note_body(&shareholder_id, note, value)))
}

async fn write(state: &AppState, shareholder_id: String, note: Note, value: Option<String>) -> ApiResult<Value> {
    let stored = state.shareholders().set_note(&shareholder_id, note, value).await?;
    tracing::info!(shareholder_id = %shareholder_id, ?note, cleared = stored.is_none(), "Updated shareholder note");
    Ok(ApiResponse::success(note_body(&shareholder_id, note, stored)))
}

/// GET .../designee - null when unset
pub async fn designee_get(State(state): State<AppState>, Path(shareholder_id): Path<String>) -> ApiResult<Value> {
    read(&state, shareholder_id, Note::Designee).await
}

/// PUT .../designee - overwrite with a trimmed, non-empty name
pub async fn designee_put(
    State(state): State<AppState>,
    Path(shareholder_id): Path<String>,
    ApiJson(body): ApiJson<DesigneeRequest>,
) -> ApiResult<Value> {
    write(&state, shareholder_id, Note::Designee, Some(body.designee)).await
}

/// DELETE .../designee
pub async fn designee_delete(State(state): State<AppState>, Path(shareholder_id): Path<String>) -> ApiResult<Value> {
    write(&state, shareholder_id, Note::Designee, None).await
}

/// GET .../comment - null when unset
pub async fn comment_get(State(state): State<AppState>, Path(shareholder_id): Path<String>) -> ApiResult<Value> {
    read(&state, shareholder_id, Note::Comment).await
}

/// PUT .../comment
pub async fn comment_put(
    State(state): State<AppState>,
    Path(shareholder_id): Path<String>,
    ApiJson(body): ApiJson<CommentRequest>,
) -> ApiResult<Value> {
    write(&state, shareholder_id, Note::Comment, Some(body.comment)).await
}

/// DELETE .../comment
pub async fn comment_delete(State(state): State<AppState>, Path(shareholder_id): Path<String>) -> ApiResult<Value> {
    write(&state, shareholder_id, Note::Comment, None).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cleared_note_serializes_as_null() {
        let body = note_body("S-1", Note::Designee, None);
        assert_eq!(body, json!({ "shareholderId": "S-1", "designee": null }));
        let body = note_body("S-1", Note::Comment, Some("Moved out of district".into()));
        assert_eq!(body["comment"], "Moved out of district");
    }
}
