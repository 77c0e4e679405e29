use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Property, PropertyTransfer};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Property {0} not found")]
    PropertyNotFound(i32),

    #[error("Shareholder {0} not found")]
    ShareholderNotFound(String),

    #[error("Property already belongs to {0}")]
    SameOwner(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for TransferError {
    fn from(err: sqlx::Error) -> Self {
        TransferError::Database(err.into())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub property: Property,
    pub transfer: PropertyTransfer,
}

pub struct TransferService {
    db: DatabaseManager,
}

impl TransferService {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    /// Move a property to another shareholder and record the move.
    /// The property takes on the new owner's attendance state.
    pub async fn transfer(
        &self,
        property_id: i32,
        to_shareholder_id: &str,
        transfer_date: Option<NaiveDate>,
    ) -> Result<TransferOutcome, TransferError> {
        let to_shareholder_id = to_shareholder_id.trim();
        let mut tx = self.db.pool().begin().await?;

        let current = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1 FOR UPDATE")
            .bind(property_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(TransferError::PropertyNotFound(property_id))?;

        if current.shareholder_id == to_shareholder_id {
            return Err(TransferError::SameOwner(to_shareholder_id.to_string()));
        }

        let target: Option<(bool,)> = sqlx::query_as(
            r#"SELECT EXISTS (
                   SELECT 1 FROM properties p WHERE p.shareholder_id = s.shareholder_id AND p.checked_in = TRUE
               )
               FROM shareholders s WHERE s.shareholder_id = $1"#,
        )
        .bind(to_shareholder_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (target_checked_in,) =
            target.ok_or_else(|| TransferError::ShareholderNotFound(to_shareholder_id.to_string()))?;

        let property = sqlx::query_as::<_, Property>(
            "UPDATE properties SET shareholder_id = $2, checked_in = $3 WHERE id = $1 RETURNING *",
        )
        .bind(property_id)
        .bind(to_shareholder_id)
        .bind(target_checked_in)
        .fetch_one(&mut *tx)
        .await?;

        let transfer = sqlx::query_as::<_, PropertyTransfer>(
            r#"INSERT INTO property_transfers (property_id, from_shareholder_id, to_shareholder_id, transfer_date, meeting_id)
               VALUES ($1, $2, $3, COALESCE($4, CURRENT_DATE), $5)
               RETURNING *"#,
        )
        .bind(property_id)
        .bind(&current.shareholder_id)
        .bind(to_shareholder_id)
        .bind(transfer_date)
        .bind(current.meeting_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(
            property_id,
            from = %current.shareholder_id,
            to = %to_shareholder_id,
            "Transferred property"
        );

        Ok(TransferOutcome { property, transfer })
    }

    /// Newest first
    pub async fn for_property(&self, property_id: i32) -> Result<Vec<PropertyTransfer>, DatabaseError> {
        let rows = sqlx::query_as::<_, PropertyTransfer>(
            "SELECT * FROM property_transfers WHERE property_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(property_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }

    pub async fn for_meeting(&self, meeting_id: i32) -> Result<Vec<PropertyTransfer>, DatabaseError> {
        let rows = sqlx::query_as::<_, PropertyTransfer>(
            "SELECT * FROM property_transfers WHERE meeting_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(meeting_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }
}
