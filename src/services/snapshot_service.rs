use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgConnection;
use tracing::{debug, info};

use super::meeting_service::{not_found, refresh_counts};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Snapshot;
use crate::database::snapshot::{EntityChange, PropertyState, ShareholderState, SnapshotData};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResult {
    /// False when the roll was unchanged since the latest snapshot
    pub created: bool,
    pub snapshot: Snapshot,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeReport {
    pub meeting_id: i32,
    pub baseline_snapshot_id: Option<i32>,
    pub changes: Vec<EntityChange>,
}

pub struct SnapshotService {
    db: DatabaseManager,
}

impl SnapshotService {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    pub async fn capture(&self, meeting_id: i32) -> Result<CaptureResult, DatabaseError> {
        let mut tx = self.db.pool().begin().await?;
        ensure_meeting(&mut tx, meeting_id).await?;

        let data = current_state(&mut tx, meeting_id).await?;
        let checksum = data.checksum();
        refresh_counts(&mut tx, meeting_id).await?;

        if let Some(latest) = latest(&mut tx, meeting_id).await? {
            if latest.checksum == checksum {
                tx.commit().await?;
                debug!(meeting_id, snapshot_id = latest.id, "Roll unchanged, snapshot skipped");
                return Ok(CaptureResult { created: false, snapshot: latest });
            }
        }

        let snapshot = sqlx::query_as::<_, Snapshot>(
            "INSERT INTO snapshots (meeting_id, data, checksum) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(meeting_id)
        .bind(Json(&data))
        .bind(&checksum)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(meeting_id, snapshot_id = snapshot.id, "Captured snapshot");
        Ok(CaptureResult { created: true, snapshot })
    }

    /// Live roll compared against the latest snapshot (everything is "added" without one)
    pub async fn changes(&self, meeting_id: i32) -> Result<ChangeReport, DatabaseError> {
        let mut conn = self.db.pool().acquire().await?;
        ensure_meeting(&mut conn, meeting_id).await?;

        let baseline = latest(&mut conn, meeting_id).await?;
        let current = current_state(&mut conn, meeting_id).await?;

        let (baseline_snapshot_id, previous) = match baseline {
            Some(snapshot) => (Some(snapshot.id), snapshot.data.0),
            None => (None, SnapshotData::default()),
        };

        Ok(ChangeReport {
            meeting_id,
            baseline_snapshot_id,
            changes: previous.diff(&current),
        })
    }
}

async fn ensure_meeting(conn: &mut PgConnection, meeting_id: i32) -> Result<(), DatabaseError> {
    let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM meetings WHERE id = $1")
        .bind(meeting_id)
        .fetch_optional(&mut *conn)
        .await?;
    exists.map(|_| ()).ok_or_else(|| not_found(meeting_id))
}

async fn latest(conn: &mut PgConnection, meeting_id: i32) -> Result<Option<Snapshot>, DatabaseError> {
    let row = sqlx::query_as::<_, Snapshot>(
        "SELECT * FROM snapshots WHERE meeting_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .bind(meeting_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

#[derive(sqlx::FromRow)]
struct KeyedShareholder {
    key: String,
    #[sqlx(flatten)]
    state: ShareholderState,
}

#[derive(sqlx::FromRow)]
struct KeyedProperty {
    key: String,
    #[sqlx(flatten)]
    state: PropertyState,
}

async fn current_state(conn: &mut PgConnection, meeting_id: i32) -> Result<SnapshotData, DatabaseError> {
    let shareholders = sqlx::query_as::<_, KeyedShareholder>(
        "SELECT shareholder_id AS key, name, is_new, designee, comment FROM shareholders WHERE meeting_id = $1",
    )
    .bind(meeting_id)
    .fetch_all(&mut *conn)
    .await?;

    let properties = sqlx::query_as::<_, KeyedProperty>(
        r#"SELECT account AS key, shareholder_id, owner_name, service_address, checked_in
           FROM properties WHERE meeting_id = $1"#,
    )
    .bind(meeting_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(SnapshotData {
        shareholders: shareholders.into_iter().map(|r| (r.key, r.state)).collect(),
        properties: properties.into_iter().map(|r| (r.key, r.state)).collect(),
    })
}
