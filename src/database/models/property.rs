use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{clean, FieldErrors};
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i32,
    pub account: String,
    pub shareholder_id: String,
    pub owner_name: Option<String>,
    pub owner_mail_address: Option<String>,
    pub owner_city: Option<String>,
    pub owner_state: Option<String>,
    pub owner_zip: Option<String>,
    pub customer_name: Option<String>,
    pub customer_mail_address: Option<String>,
    pub resident_name: Option<String>,
    pub service_address: Option<String>,
    pub checked_in: bool,
    pub meeting_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub account: String,
    pub shareholder_id: String,
    pub owner_name: Option<String>,
    pub owner_mail_address: Option<String>,
    pub owner_city: Option<String>,
    pub owner_state: Option<String>,
    pub owner_zip: Option<String>,
    pub customer_name: Option<String>,
    pub customer_mail_address: Option<String>,
    pub resident_name: Option<String>,
    pub service_address: Option<String>,
    pub meeting_id: Option<i32>,
}

impl NewProperty {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        errors.require("account", &self.account);
        errors.require("shareholderId", &self.shareholder_id);
        errors.into_result("Invalid property")
    }

    pub fn normalized(mut self) -> Self {
        self.account = self.account.trim().to_string();
        self.shareholder_id = self.shareholder_id.trim().to_string();
        self.owner_name = clean(&self.owner_name);
        self.owner_mail_address = clean(&self.owner_mail_address);
        self.owner_city = clean(&self.owner_city);
        self.owner_state = clean(&self.owner_state);
        self.owner_zip = clean(&self.owner_zip);
        self.customer_name = clean(&self.customer_name);
        self.customer_mail_address = clean(&self.customer_mail_address);
        self.resident_name = clean(&self.resident_name);
        self.service_address = clean(&self.service_address);
        self
    }
}

/// Partial update of descriptive fields. Ownership changes go through transfers
/// and attendance through check-in, so neither is accepted here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyUpdate {
    pub owner_name: Option<String>,
    pub owner_mail_address: Option<String>,
    pub owner_city: Option<String>,
    pub owner_state: Option<String>,
    pub owner_zip: Option<String>,
    pub customer_name: Option<String>,
    pub customer_mail_address: Option<String>,
    pub resident_name: Option<String>,
    pub service_address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case() {
        let p = Property {
            id: 1,
            account: "100-200".into(),
            shareholder_id: "S-1".into(),
            owner_name: Some("Jones".into()),
            owner_mail_address: None,
            owner_city: None,
            owner_state: None,
            owner_zip: None,
            customer_name: None,
            customer_mail_address: None,
            resident_name: None,
            service_address: Some("12 Canal Rd".into()),
            checked_in: true,
            meeting_id: Some(3),
            created_at: Utc::now(),
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["shareholderId"], "S-1");
        assert_eq!(v["serviceAddress"], "12 Canal Rd");
        assert_eq!(v["checkedIn"], true);
        assert!(v.get("checked_in").is_none());
    }

    #[test]
    fn update_refuses_ownership_and_attendance_fields() {
        assert!(serde_json::from_str::<PropertyUpdate>(r#"{"checkedIn":true}"#).is_err());
        assert!(serde_json::from_str::<PropertyUpdate>(r#"{"shareholderId":"S-2"}"#).is_err());
        assert!(serde_json::from_str::<PropertyUpdate>(r#"{"residentName":"Lee"}"#).is_ok());
    }

    #[test]
    fn requires_account_and_owner_key() {
        assert!(NewProperty::default().validate().is_err());
        let ok = NewProperty { account: "A1".into(), shareholder_id: "S-1".into(), ..Default::default() };
        assert!(ok.validate().is_ok());
    }
}
