use serde::{Deserialize, Serialize};

use super::{clean, FieldErrors, NewProperty, NewShareholder};
use crate::error::ApiError;

/// One upload of roll data for a meeting (typically the billing export).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    pub data_source: Option<String>,
    #[serde(default)]
    pub shareholders: Vec<NewShareholder>,
    #[serde(default)]
    pub properties: Vec<NewProperty>,
}

impl ImportBatch {
    /// Row-level validation; field keys carry the row index, e.g. `properties[3].account`
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::default();
        if self.shareholders.is_empty() && self.properties.is_empty() {
            errors.add("shareholders", "Import batch is empty");
        }
        errors.not_blank("dataSource", self.data_source.as_deref());

        for (i, s) in self.shareholders.iter().enumerate() {
            errors.require(&format!("shareholders[{}].shareholderId", i), &s.shareholder_id);
            errors.require(&format!("shareholders[{}].name", i), &s.name);
        }
        for (i, p) in self.properties.iter().enumerate() {
            errors.require(&format!("properties[{}].account", i), &p.account);
            errors.require(&format!("properties[{}].shareholderId", i), &p.shareholder_id);
        }
        errors.into_result("Invalid import batch")
    }

    pub fn data_source(&self) -> Option<String> {
        clean(&self.data_source)
    }

    pub fn len(&self) -> usize {
        self.shareholders.len() + self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub meeting_id: i32,
    pub shareholders: usize,
    pub properties: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch_is_rejected() {
        assert!(ImportBatch::default().validate().is_err());
    }

    #[test]
    fn row_errors_name_the_row() {
        let batch: ImportBatch = serde_json::from_str(
            r#"{"shareholders":[{"shareholderId":"S-1","name":"Ann"},{"shareholderId":"S-2","name":" "}],
                "properties":[{"account":"","shareholderId":"S-1"}]}"#,
        )
        .unwrap();
        let body = batch.validate().unwrap_err().to_json();
        assert_eq!(body["fieldErrors"]["shareholders[1].name"], "This field is required");
        assert_eq!(body["fieldErrors"]["properties[0].account"], "This field is required");
        assert!(body["fieldErrors"].get("shareholders[0].name").is_none());
        assert_eq!(batch.len(), 3);
    }
}
