use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgConnection};
use tracing::info;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Meeting, MeetingStats, NewMeeting};

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMeeting {
    pub meeting_id: i32,
    pub transfers: u64,
    pub snapshots: u64,
    pub properties: u64,
    pub shareholders: u64,
}

/// Live aggregate over one meeting's rows
const STATS_SQL: &str = r#"
    SELECT
        (SELECT COUNT(*) FROM shareholders s WHERE s.meeting_id = $1) AS total_shareholders,
        (SELECT COUNT(*) FROM shareholders s WHERE s.meeting_id = $1 AND EXISTS (
            SELECT 1 FROM properties p WHERE p.shareholder_id = s.shareholder_id AND p.checked_in = TRUE
        )) AS checked_in_shareholders,
        (SELECT COUNT(*) FROM properties p WHERE p.meeting_id = $1) AS total_properties,
        (SELECT COUNT(*) FROM properties p WHERE p.meeting_id = $1 AND p.checked_in = TRUE) AS checked_in_properties
"#;

pub struct MeetingService {
    db: DatabaseManager,
}

impl MeetingService {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<Meeting>, DatabaseError> {
        let rows = self.db.query("SELECT * FROM meetings ORDER BY date DESC, id DESC", &[]).await?;
        let meetings = rows.iter().map(Meeting::from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(meetings)
    }

    pub async fn get(&self, id: i32) -> Result<Meeting, DatabaseError> {
        let row = self
            .db
            .query_one("SELECT * FROM meetings WHERE id = $1", &[Value::from(id)])
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(Meeting::from_row(&row)?)
    }

    pub async fn stats(&self, id: i32) -> Result<MeetingStats, DatabaseError> {
        self.get(id).await?;
        let stats = sqlx::query_as::<_, MeetingStats>(STATS_SQL)
            .bind(id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(stats)
    }

    pub async fn create(&self, input: NewMeeting) -> Result<Meeting, DatabaseError> {
        let meeting = sqlx::query_as::<_, Meeting>(
            "INSERT INTO meetings (year, date, data_source) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(input.year)
        .bind(input.date)
        .bind(input.data_source())
        .fetch_one(self.db.pool())
        .await?;

        info!(meeting_id = meeting.id, year = meeting.year, "Created meeting");
        Ok(meeting)
    }

    /// Removes the meeting and everything tied to it, all or nothing
    pub async fn delete(&self, id: i32) -> Result<DeletedMeeting, DatabaseError> {
        let mut tx = self.db.pool().begin().await?;

        let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM meetings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(not_found(id));
        }

        let mut deleted = DeletedMeeting { meeting_id: id, ..Default::default() };
        for (table, count) in [
            ("property_transfers", &mut deleted.transfers),
            ("snapshots", &mut deleted.snapshots),
            ("properties", &mut deleted.properties),
            ("shareholders", &mut deleted.shareholders),
        ] {
            *count = sqlx::query(&format!("DELETE FROM {} WHERE meeting_id = $1", table))
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        }

        sqlx::query("DELETE FROM meetings WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(
            meeting_id = id,
            shareholders = deleted.shareholders,
            properties = deleted.properties,
            "Deleted meeting"
        );
        Ok(deleted)
    }

    pub async fn set_mailers_generated(&self, id: i32, generated: bool) -> Result<Meeting, DatabaseError> {
        sqlx::query_as::<_, Meeting>("UPDATE meetings SET mailers_generated = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(generated)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| not_found(id))
    }
}

/// Store the current totals on the meeting row
pub(crate) async fn refresh_counts(conn: &mut PgConnection, meeting_id: i32) -> Result<MeetingStats, DatabaseError> {
    let stats = sqlx::query_as::<_, MeetingStats>(STATS_SQL)
        .bind(meeting_id)
        .fetch_one(&mut *conn)
        .await?;

    sqlx::query("UPDATE meetings SET total_shareholders = $2, checked_in_count = $3 WHERE id = $1")
        .bind(meeting_id)
        .bind(stored_count(stats.total_shareholders, "total_shareholders")?)
        .bind(stored_count(stats.checked_in_shareholders, "checked_in_count")?)
        .execute(&mut *conn)
        .await?;

    Ok(stats)
}

/// Meeting count columns are INTEGER
fn stored_count(count: i64, column: &str) -> Result<i32, DatabaseError> {
    i32::try_from(count).map_err(|_| DatabaseError::QueryError(format!("{} out of range: {}", column, count)))
}

pub(crate) fn not_found(id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("Meeting {} not found", id))
}
