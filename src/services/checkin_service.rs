use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::database::manager::{DatabaseError, DatabaseManager};

#[derive(Debug, Error)]
pub enum CheckInError {
    #[error("Shareholder {0} not found")]
    ShareholderNotFound(String),

    #[error("Shareholder {0} is already checked in")]
    AlreadyCheckedIn(String),

    #[error("Shareholder {0} has no properties")]
    NoProperties(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for CheckInError {
    fn from(err: sqlx::Error) -> Self {
        CheckInError::Database(err.into())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResult {
    pub shareholder_id: String,
    pub checked_in: bool,
    pub properties_updated: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResetResult {
    pub properties_reset: u64,
    pub signatures_cleared: u64,
}

/// Attendance state lives on properties; a shareholder is checked in when any of
/// their properties is.
pub struct CheckInService {
    db: DatabaseManager,
}

impl CheckInService {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    /// Check in every property of a shareholder. A second check-in is refused
    /// rather than treated as a no-op.
    pub async fn check_in(&self, shareholder_id: &str, signature: Option<String>) -> Result<CheckInResult, CheckInError> {
        let mut tx = self.db.pool().begin().await?;

        let exists: Option<(i32,)> =
            sqlx::query_as("SELECT id FROM shareholders WHERE shareholder_id = $1 FOR UPDATE")
                .bind(shareholder_id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Err(CheckInError::ShareholderNotFound(shareholder_id.to_string()));
        }

        let flags: Vec<(bool,)> =
            sqlx::query_as("SELECT checked_in FROM properties WHERE shareholder_id = $1 FOR UPDATE")
                .bind(shareholder_id)
                .fetch_all(&mut *tx)
                .await?;
        if flags.is_empty() {
            return Err(CheckInError::NoProperties(shareholder_id.to_string()));
        }
        if flags.iter().any(|(checked_in,)| *checked_in) {
            return Err(CheckInError::AlreadyCheckedIn(shareholder_id.to_string()));
        }

        let properties_updated = sqlx::query("UPDATE properties SET checked_in = TRUE WHERE shareholder_id = $1")
            .bind(shareholder_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let signed_at = match signature {
            Some(signature) => {
                let (signed_at,): (DateTime<Utc>,) = sqlx::query_as(
                    "UPDATE shareholders SET signature = $2, signed_at = NOW() WHERE shareholder_id = $1 RETURNING signed_at",
                )
                .bind(shareholder_id)
                .bind(signature)
                .fetch_one(&mut *tx)
                .await?;
                Some(signed_at)
            }
            None => None,
        };

        tx.commit().await?;
        info!(shareholder_id, properties_updated, signed = signed_at.is_some(), "Checked in shareholder");

        Ok(CheckInResult {
            shareholder_id: shareholder_id.to_string(),
            checked_in: true,
            properties_updated,
            signed_at,
        })
    }

    /// Unconditional: undoing a shareholder who is not checked in succeeds.
    /// A captured signature is kept.
    pub async fn undo_check_in(&self, shareholder_id: &str) -> Result<CheckInResult, CheckInError> {
        let mut tx = self.db.pool().begin().await?;

        let exists: Option<(i32,)> = sqlx::query_as("SELECT id FROM shareholders WHERE shareholder_id = $1")
            .bind(shareholder_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(CheckInError::ShareholderNotFound(shareholder_id.to_string()));
        }

        let properties_updated = sqlx::query("UPDATE properties SET checked_in = FALSE WHERE shareholder_id = $1")
            .bind(shareholder_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        info!(shareholder_id, properties_updated, "Undid check-in");

        Ok(CheckInResult {
            shareholder_id: shareholder_id.to_string(),
            checked_in: false,
            properties_updated,
            signed_at: None,
        })
    }

    /// Reset attendance for everyone. Designees and comments are left alone.
    pub async fn uncheck_all(&self) -> Result<ResetResult, CheckInError> {
        let mut tx = self.db.pool().begin().await?;

        let properties_reset = sqlx::query("UPDATE properties SET checked_in = FALSE WHERE checked_in = TRUE")
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let signatures_cleared = sqlx::query(
            "UPDATE shareholders SET signature = NULL, signed_at = NULL WHERE signature IS NOT NULL OR signed_at IS NOT NULL",
        )
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;
        info!(properties_reset, signatures_cleared, "Reset all check-ins");

        Ok(ResetResult { properties_reset, signatures_cleared })
    }
}
