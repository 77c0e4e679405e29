use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::FieldErrors;
use crate::error::ApiError;

/// Append-only record of a property changing owners
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PropertyTransfer {
    pub id: i32,
    pub property_id: i32,
    pub from_shareholder_id: Option<String>,
    pub to_shareholder_id: String,
    pub transfer_date: NaiveDate,
    pub meeting_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub to_shareholder_id: String,
    pub transfer_date: Option<NaiveDate>,
}

impl TransferRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.require("toShareholderId", &self.to_shareholder_id);
        errors.into_result("Invalid transfer")
    }
}
