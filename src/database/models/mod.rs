pub mod import;
pub mod meeting;
pub mod property;
pub mod shareholder;
pub mod snapshot;
pub mod transfer;

pub use import::{ImportBatch, ImportSummary};
pub use meeting::{MailerStatus, Meeting, MeetingStats, NewMeeting};
pub use property::{NewProperty, Property, PropertyUpdate};
pub use shareholder::{
    CheckInRequest, CommentRequest, DesigneeRequest, NewShareholder, Shareholder, ShareholderDetail, ShareholderSummary,
    ShareholderUpdate,
};
pub use snapshot::Snapshot;
pub use transfer::{PropertyTransfer, TransferRequest};

use std::collections::HashMap;

use crate::error::ApiError;

/// Collects per-field validation messages for request bodies.
#[derive(Debug, Default)]
pub struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    pub fn require(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.0.insert(field.to_string(), "This field is required".to_string());
        }
        self
    }

    /// Present-but-blank optional fields are rejected; absent ones are fine
    pub fn not_blank(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        if let Some(v) = value {
            self.require(field, v);
        }
        self
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.0.insert(field.to_string(), message.into());
        self
    }

    pub fn into_result(self, message: &str) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(message, Some(self.0)))
        }
    }
}

/// Trim and drop empty strings from optional text inputs
pub(crate) fn clean(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Partial-update value for a nullable text column. Bound into
/// `NULLIF(COALESCE($n, col), '')`: absent keeps the stored value, blank clears it.
pub(crate) fn patch(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_keeps_blank_as_empty_so_it_clears() {
        assert_eq!(patch(&None), None);
        assert_eq!(patch(&Some("   ".into())), Some(String::new()));
        assert_eq!(patch(&Some(" Fresno ".into())), Some("Fresno".to_string()));
        assert_eq!(clean(&Some("   ".into())), None);
    }
}
