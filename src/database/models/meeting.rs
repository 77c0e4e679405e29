use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{clean, FieldErrors};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: i32,
    pub year: i32,
    pub date: NaiveDate,
    pub total_shareholders: i32,
    pub checked_in_count: i32,
    pub data_source: Option<String>,
    pub has_initial_data: bool,
    pub mailers_generated: bool,
    pub created_at: DateTime<Utc>,
}

/// Live attendance aggregate for one meeting
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeetingStats {
    pub total_shareholders: i64,
    pub checked_in_shareholders: i64,
    pub total_properties: i64,
    pub checked_in_properties: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeeting {
    pub year: i32,
    pub date: NaiveDate,
    pub data_source: Option<String>,
}

impl NewMeeting {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        if !(1900..=2200).contains(&self.year) {
            errors.add("year", "Year must be between 1900 and 2200");
        }
        errors.not_blank("dataSource", self.data_source.as_deref());
        errors.into_result("Invalid meeting")
    }

    pub fn data_source(&self) -> Option<String> {
        clean(&self.data_source)
    }
}

/// Body for recording whether the external mailer run finished
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailerStatus {
    pub generated: bool,
}
