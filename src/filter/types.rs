use serde::{Deserialize, Serialize};

/// Query-string shape shared by the shareholder and property listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub checked_in: Option<bool>,
    pub meeting_id: Option<i32>,
}

/// How "checked in" is expressed for a listed table
#[derive(Debug, Clone, Copy)]
pub enum CheckedInPredicate {
    /// Boolean column on the row itself
    Column(&'static str),
    /// Row counts as checked in when any property sharing its business key is
    PropertyExists { table: &'static str, key_column: &'static str },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<serde_json::Value>,
}

/// One page of a listing plus the total row count under the same filter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 { (total + page_size - 1) / page_size } else { 0 };
        Self { items, total, page, page_size, total_pages }
    }
}
