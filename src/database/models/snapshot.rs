use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::database::snapshot::SnapshotData;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: i32,
    pub meeting_id: i32,
    pub data: Json<SnapshotData>,
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}
