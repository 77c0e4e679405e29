use serde::Serialize;
use serde_json::Value;
use sqlx::Row;
use tracing::info;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    patch, NewShareholder, Property, Shareholder, ShareholderDetail, ShareholderSummary, ShareholderUpdate,
};
use crate::database::QueryBuilder;
use crate::filter::{Listing, Page};

/// Free-text fields kept on the shareholder row and edited on their own endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Note {
    Designee,
    Comment,
}

impl Note {
    fn column(self) -> &'static str {
        match self {
            Note::Designee => "designee",
            Note::Comment => "comment",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedShareholder {
    pub shareholder_id: String,
    pub properties_removed: u64,
}

pub struct ShareholderService {
    db: DatabaseManager,
}

impl ShareholderService {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    pub async fn list(&self, listing: &Listing) -> Result<Page<ShareholderSummary>, DatabaseError> {
        let builder = QueryBuilder::new(&self.db);
        let items = builder.fetch_all::<ShareholderSummary>(&listing.to_sql()?).await?;
        let total = builder.fetch_count(&listing.to_count_sql()?).await?;
        Ok(Page::new(items, total, listing.page(), listing.page_size()))
    }

    pub async fn find(&self, shareholder_id: &str) -> Result<Option<Shareholder>, DatabaseError> {
        let row = sqlx::query_as::<_, Shareholder>("SELECT * FROM shareholders WHERE shareholder_id = $1")
            .bind(shareholder_id)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row)
    }

    /// Shareholder with its properties; `checkedIn` is derived from them
    pub async fn get(&self, shareholder_id: &str) -> Result<ShareholderDetail, DatabaseError> {
        let shareholder = self.find(shareholder_id).await?.ok_or_else(|| not_found(shareholder_id))?;

        let properties = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE shareholder_id = $1 ORDER BY account ASC",
        )
        .bind(shareholder_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(ShareholderDetail::new(shareholder, properties))
    }

    pub async fn create(&self, input: NewShareholder) -> Result<Shareholder, DatabaseError> {
        let input = input.normalized();
        let created = sqlx::query_as::<_, Shareholder>(
            r#"INSERT INTO shareholders
                (shareholder_id, name, owner_mail_address, owner_city, owner_state, owner_zip, is_new, meeting_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING *"#,
        )
        .bind(&input.shareholder_id)
        .bind(&input.name)
        .bind(&input.owner_mail_address)
        .bind(&input.owner_city)
        .bind(&input.owner_state)
        .bind(&input.owner_zip)
        .bind(input.is_new)
        .bind(input.meeting_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| match DatabaseError::from(e) {
            DatabaseError::Conflict(_) => {
                DatabaseError::Conflict(format!("Shareholder {} already exists", input.shareholder_id))
            }
            other => other,
        })?;

        info!(shareholder_id = %created.shareholder_id, "Created shareholder");
        Ok(created)
    }

    pub async fn update(&self, shareholder_id: &str, update: ShareholderUpdate) -> Result<Shareholder, DatabaseError> {
        sqlx::query_as::<_, Shareholder>(
            r#"UPDATE shareholders SET
                name = COALESCE($2, name),
                owner_mail_address = NULLIF(COALESCE($3, owner_mail_address), ''),
                owner_city = NULLIF(COALESCE($4, owner_city), ''),
                owner_state = NULLIF(COALESCE($5, owner_state), ''),
                owner_zip = NULLIF(COALESCE($6, owner_zip), ''),
                is_new = COALESCE($7, is_new)
               WHERE shareholder_id = $1
               RETURNING *"#,
        )
        .bind(shareholder_id)
        .bind(patch(&update.name))
        .bind(patch(&update.owner_mail_address))
        .bind(patch(&update.owner_city))
        .bind(patch(&update.owner_state))
        .bind(patch(&update.owner_zip))
        .bind(update.is_new)
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| not_found(shareholder_id))
    }

    /// Removes the shareholder and every property keyed to it
    pub async fn delete(&self, shareholder_id: &str) -> Result<DeletedShareholder, DatabaseError> {
        let mut tx = self.db.pool().begin().await?;

        let removed = sqlx::query("DELETE FROM shareholders WHERE shareholder_id = $1")
            .bind(shareholder_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if removed == 0 {
            return Err(not_found(shareholder_id));
        }

        let properties_removed = sqlx::query("DELETE FROM properties WHERE shareholder_id = $1")
            .bind(shareholder_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        info!(shareholder_id, properties_removed, "Deleted shareholder");

        Ok(DeletedShareholder {
            shareholder_id: shareholder_id.to_string(),
            properties_removed,
        })
    }

    pub async fn get_note(&self, shareholder_id: &str, note: Note) -> Result<Option<String>, DatabaseError> {
        let column = note.column();
        let sql = format!("SELECT {} FROM shareholders WHERE shareholder_id = $1", column);
        let row = self
            .db
            .query_one(&sql, &[Value::from(shareholder_id)])
            .await?
            .ok_or_else(|| not_found(shareholder_id))?;
        Ok(row.try_get::<Option<String>, _>(column)?)
    }

    /// Overwrite (`Some`) or clear (`None`) a note, returning the stored value
    pub async fn set_note(
        &self,
        shareholder_id: &str,
        note: Note,
        value: Option<String>,
    ) -> Result<Option<String>, DatabaseError> {
        let column = note.column();
        let sql = format!(
            "UPDATE shareholders SET {col} = $2 WHERE shareholder_id = $1 RETURNING {col}",
            col = column
        );
        let params = [Value::from(shareholder_id), value.map(Value::String).unwrap_or(Value::Null)];
        let row = self
            .db
            .query_one(&sql, &params)
            .await?
            .ok_or_else(|| not_found(shareholder_id))?;
        Ok(row.try_get::<Option<String>, _>(column)?)
    }
}

fn not_found(shareholder_id: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("Shareholder {} not found", shareholder_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_map_to_their_own_columns() {
        assert_eq!(Note::Designee.column(), "designee");
        assert_eq!(Note::Comment.column(), "comment");
    }

    #[test]
    fn not_found_names_the_business_key() {
        let err = not_found("S-404");
        assert_eq!(err.to_string(), "Not found: Shareholder S-404 not found");
    }
}
