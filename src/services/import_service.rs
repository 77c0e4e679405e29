use std::collections::BTreeSet;

use tracing::info;

use super::meeting_service::{not_found, refresh_counts};
use super::progress::{ProgressEvent, ProgressHub, PROGRESS_STEP};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{ImportBatch, ImportSummary};

/// Loads a meeting's roll. Shareholders upsert on their business key and
/// properties on account; attendance state on existing properties is kept.
pub struct ImportService {
    db: DatabaseManager,
    progress: ProgressHub,
}

impl ImportService {
    pub fn new(db: DatabaseManager, progress: ProgressHub) -> Self {
        Self { db, progress }
    }

    pub async fn import(&self, meeting_id: i32, batch: ImportBatch) -> Result<ImportSummary, DatabaseError> {
        let total = batch.len();
        let data_source = batch.data_source();
        let mut processed = 0usize;
        let mut tx = self.db.pool().begin().await?;

        let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM meetings WHERE id = $1 FOR UPDATE")
            .bind(meeting_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(not_found(meeting_id));
        }

        for row in batch.shareholders {
            let row = row.normalized();
            sqlx::query(
                r#"INSERT INTO shareholders
                    (shareholder_id, name, owner_mail_address, owner_city, owner_state, owner_zip, is_new, meeting_id)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                   ON CONFLICT (shareholder_id) DO UPDATE SET
                    name = EXCLUDED.name,
                    owner_mail_address = EXCLUDED.owner_mail_address,
                    owner_city = EXCLUDED.owner_city,
                    owner_state = EXCLUDED.owner_state,
                    owner_zip = EXCLUDED.owner_zip,
                    is_new = EXCLUDED.is_new,
                    meeting_id = EXCLUDED.meeting_id"#,
            )
            .bind(&row.shareholder_id)
            .bind(&row.name)
            .bind(&row.owner_mail_address)
            .bind(&row.owner_city)
            .bind(&row.owner_state)
            .bind(&row.owner_zip)
            .bind(row.is_new)
            .bind(meeting_id)
            .execute(&mut *tx)
            .await?;

            processed += 1;
            self.report(meeting_id, processed, total);
        }
        let shareholders = processed;

        let owners: Vec<String> = batch
            .properties
            .iter()
            .map(|p| p.shareholder_id.trim().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let known: Vec<(String,)> = sqlx::query_as("SELECT shareholder_id FROM shareholders WHERE shareholder_id = ANY($1)")
            .bind(&owners)
            .fetch_all(&mut *tx)
            .await?;
        let known: BTreeSet<String> = known.into_iter().map(|(id,)| id).collect();
        if let Some(missing) = owners.iter().find(|id| !known.contains(*id)) {
            return Err(DatabaseError::NotFound(format!("Shareholder {} not found", missing)));
        }

        for row in batch.properties {
            let row = row.normalized();
            sqlx::query(
                r#"INSERT INTO properties
                    (account, shareholder_id, owner_name, owner_mail_address, owner_city, owner_state, owner_zip,
                     customer_name, customer_mail_address, resident_name, service_address, meeting_id)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
                   ON CONFLICT (account) DO UPDATE SET
                    shareholder_id = EXCLUDED.shareholder_id,
                    owner_name = EXCLUDED.owner_name,
                    owner_mail_address = EXCLUDED.owner_mail_address,
                    owner_city = EXCLUDED.owner_city,
                    owner_state = EXCLUDED.owner_state,
                    owner_zip = EXCLUDED.owner_zip,
                    customer_name = EXCLUDED.customer_name,
                    customer_mail_address = EXCLUDED.customer_mail_address,
                    resident_name = EXCLUDED.resident_name,
                    service_address = EXCLUDED.service_address,
                    meeting_id = EXCLUDED.meeting_id"#,
            )
            .bind(&row.account)
            .bind(&row.shareholder_id)
            .bind(&row.owner_name)
            .bind(&row.owner_mail_address)
            .bind(&row.owner_city)
            .bind(&row.owner_state)
            .bind(&row.owner_zip)
            .bind(&row.customer_name)
            .bind(&row.customer_mail_address)
            .bind(&row.resident_name)
            .bind(&row.service_address)
            .bind(meeting_id)
            .execute(&mut *tx)
            .await?;

            processed += 1;
            self.report(meeting_id, processed, total);
        }
        let properties = processed - shareholders;

        sqlx::query(
            "UPDATE meetings SET has_initial_data = TRUE, data_source = COALESCE($2, data_source) WHERE id = $1",
        )
        .bind(meeting_id)
        .bind(data_source)
        .execute(&mut *tx)
        .await?;
        refresh_counts(&mut tx, meeting_id).await?;

        tx.commit().await?;

        if processed % PROGRESS_STEP != 0 {
            self.progress.publish(ProgressEvent::Import { meeting_id, processed, total });
        }
        info!(meeting_id, shareholders, properties, "Imported meeting roll");

        Ok(ImportSummary { meeting_id, shareholders, properties })
    }

    fn report(&self, meeting_id: i32, processed: usize, total: usize) {
        if processed % PROGRESS_STEP == 0 {
            self.progress.publish(ProgressEvent::Import { meeting_id, processed, total });
        }
    }
}
