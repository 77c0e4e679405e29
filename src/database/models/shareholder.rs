use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{clean, FieldErrors, Property};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Shareholder {
    pub id: i32,
    pub shareholder_id: String,
    pub name: String,
    pub owner_mail_address: Option<String>,
    pub owner_city: Option<String>,
    pub owner_state: Option<String>,
    pub owner_zip: Option<String>,
    pub is_new: bool,
    pub designee: Option<String>,
    pub comment: Option<String>,
    pub signature: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub meeting_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Listing row: the shareholder plus attendance derived from its properties
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShareholderSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub shareholder: Shareholder,
    pub checked_in: bool,
    pub property_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareholderDetail {
    #[serde(flatten)]
    pub shareholder: Shareholder,
    pub checked_in: bool,
    pub properties: Vec<Property>,
}

impl ShareholderDetail {
    pub fn new(shareholder: Shareholder, properties: Vec<Property>) -> Self {
        let checked_in = properties.iter().any(|p| p.checked_in);
        Self { shareholder, checked_in, properties }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewShareholder {
    pub shareholder_id: String,
    pub name: String,
    pub owner_mail_address: Option<String>,
    pub owner_city: Option<String>,
    pub owner_state: Option<String>,
    pub owner_zip: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    pub meeting_id: Option<i32>,
}

impl NewShareholder {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.require("shareholderId", &self.shareholder_id);
        errors.require("name", &self.name);
        errors.into_result("Invalid shareholder")
    }

    pub fn normalized(mut self) -> Self {
        self.shareholder_id = self.shareholder_id.trim().to_string();
        self.name = self.name.trim().to_string();
        self.owner_mail_address = clean(&self.owner_mail_address);
        self.owner_city = clean(&self.owner_city);
        self.owner_state = clean(&self.owner_state);
        self.owner_zip = clean(&self.owner_zip);
        self
    }
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareholderUpdate {
    pub name: Option<String>,
    pub owner_mail_address: Option<String>,
    pub owner_city: Option<String>,
    pub owner_state: Option<String>,
    pub owner_zip: Option<String>,
    pub is_new: Option<bool>,
}

impl ShareholderUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.not_blank("name", self.name.as_deref());
        errors.into_result("Invalid shareholder update")
    }
}

/// Body of `POST /api/shareholders/:id/checkin`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub signature: Option<String>,
}

impl CheckInRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.not_blank("signature", self.signature.as_deref());
        errors.into_result("Invalid check-in")
    }
}

/// Body of `PUT .../designee`; stored as sent (DELETE clears it)
#[derive(Debug, Clone, Deserialize)]
pub struct DesigneeRequest {
    pub designee: String,
}

/// Body of `PUT .../comment`; stored as sent (DELETE clears it)
#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_business_key_and_name() {
        let err = NewShareholder::default().validate().unwrap_err();
        let body = err.to_json();
        assert_eq!(body["fieldErrors"]["shareholderId"], "This field is required");
        assert_eq!(body["fieldErrors"]["name"], "This field is required");
    }

    #[test]
    fn normalizes_whitespace_and_blank_optionals() {
        let s = NewShareholder {
            shareholder_id: "  S-100 ".into(),
            name: " Ada Lovelace ".into(),
            owner_city: Some("   ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(s.shareholder_id, "S-100");
        assert_eq!(s.name, "Ada Lovelace");
        assert!(s.owner_city.is_none());
    }

    #[test]
    fn update_rejects_blank_name_but_allows_absent() {
        assert!(ShareholderUpdate { name: Some(" ".into()), ..Default::default() }.validate().is_err());
        assert!(ShareholderUpdate::default().validate().is_ok());
    }

    #[test]
    fn check_in_body_is_optional_but_signature_cannot_be_blank() {
        let empty: CheckInRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_ok());
        let blank = CheckInRequest { signature: Some("  ".into()) };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn note_bodies_accept_any_text() {
        let designee: DesigneeRequest = serde_json::from_str(r#"{"designee":"  Pat Quinn "}"#).unwrap();
        assert_eq!(designee.designee, "  Pat Quinn ");
        let comment: CommentRequest = serde_json::from_str(r#"{"comment":""}"#).unwrap();
        assert_eq!(comment.comment, "");
        assert!(serde_json::from_str::<DesigneeRequest>("{}").is_err());
    }
}
