use serde_json::Value;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{CheckedInPredicate, ListingQuery, SqlResult};
use crate::config::ListingConfig;

/// Static description of a listable table.
#[derive(Debug, Clone, Copy)]
pub struct ListingSource {
    pub table: &'static str,
    /// Fixed select list; never built from request input
    pub select: &'static str,
    pub search_columns: &'static [&'static str],
    pub checked_in: CheckedInPredicate,
    pub order: &'static str,
}

pub const PROPERTY_LISTING: ListingSource = ListingSource {
    table: "properties",
    select: "*",
    search_columns: &["account", "service_address", "customer_name", "owner_name", "resident_name"],
    checked_in: CheckedInPredicate::Column("checked_in"),
    order: "account asc",
};

pub const SHAREHOLDER_LISTING: ListingSource = ListingSource {
    table: "shareholders",
    select: "\"shareholders\".*, \
        EXISTS (SELECT 1 FROM \"properties\" p WHERE p.\"shareholder_id\" = \"shareholders\".\"shareholder_id\" AND p.\"checked_in\" = TRUE) AS \"checked_in\", \
        (SELECT COUNT(*) FROM \"properties\" p WHERE p.\"shareholder_id\" = \"shareholders\".\"shareholder_id\") AS \"property_count\"",
    search_columns: &["shareholder_id", "name", "owner_mail_address"],
    checked_in: CheckedInPredicate::PropertyExists { table: "shareholders", key_column: "shareholder_id" },
    order: "shareholder_id asc",
};

/// A validated page request against one listing source.
#[derive(Debug, Clone)]
pub struct Listing {
    source: ListingSource,
    page: i64,
    page_size: i64,
    search: Option<String>,
    checked_in: Option<bool>,
    meeting_id: Option<i32>,
}

impl Listing {
    pub fn new(source: ListingSource, query: &ListingQuery, config: &ListingConfig) -> Result<Self, FilterError> {
        let page = query.page.unwrap_or(1);
        if page < 1 {
            return Err(FilterError::InvalidPage("page must be 1 or greater".to_string()));
        }

        let requested = query.page_size.unwrap_or(config.default_page_size);
        if requested < 1 {
            return Err(FilterError::InvalidPageSize("pageSize must be 1 or greater".to_string()));
        }
        let page_size = if requested > config.max_page_size {
            tracing::debug!("pageSize {} exceeds max {}, capping", requested, config.max_page_size);
            config.max_page_size
        } else {
            requested
        };
        if (page - 1).checked_mul(page_size).is_none() {
            return Err(FilterError::InvalidPage("page is too large".to_string()));
        }

        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            source,
            page,
            page_size,
            search,
            checked_in: query.checked_in,
            meeting_id: query.meeting_id,
        })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = self.where_clause()?;
        let order_clause = FilterOrder::generate(&FilterOrder::parse(self.source.order)?);

        let query = [
            format!("SELECT {}", self.source.select),
            format!("FROM \"{}\"", self.source.table),
            if where_clause.is_empty() { String::new() } else { format!("WHERE {}", where_clause) },
            order_clause,
            format!("LIMIT {} OFFSET {}", self.page_size, self.offset()),
        ].into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ");

        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        let (where_clause, params) = self.where_clause()?;
        let query = if where_clause.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.source.table)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.source.table, where_clause)
        };
        Ok(SqlResult { query, params })
    }

    fn where_clause(&self) -> Result<(String, Vec<Value>), FilterError> {
        let mut filter_where = FilterWhere::new(0);
        if let Some(term) = &self.search {
            filter_where.search_any(self.source.search_columns, term)?;
        }
        if let Some(checked_in) = self.checked_in {
            filter_where.checked_in(self.source.checked_in, checked_in)?;
        }
        if let Some(meeting_id) = self.meeting_id {
            filter_where.eq("meeting_id", Value::from(meeting_id))?;
        }
        Ok(filter_where.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ListingConfig {
        ListingConfig { default_page_size: 25, max_page_size: 100 }
    }

    fn query(page: Option<i64>, page_size: Option<i64>, search: Option<&str>, checked_in: Option<bool>) -> ListingQuery {
        ListingQuery {
            page,
            page_size,
            search: search.map(str::to_string),
            checked_in,
            meeting_id: None,
        }
    }

    #[test]
    fn offset_is_page_minus_one_times_page_size() {
        for page in 1..=20 {
            for size in [1, 7, 25, 100] {
                let listing = Listing::new(PROPERTY_LISTING, &query(Some(page), Some(size), None, None), &config()).unwrap();
                assert_eq!(listing.offset(), (page - 1) * size);
                assert!(listing.to_sql().unwrap().query.ends_with(&format!("LIMIT {} OFFSET {}", size, (page - 1) * size)));
            }
        }
    }

    #[test]
    fn unfiltered_property_listing_orders_by_account() {
        let listing = Listing::new(PROPERTY_LISTING, &ListingQuery::default(), &config()).unwrap();
        let sql = listing.to_sql().unwrap();
        assert_eq!(sql.query, "SELECT * FROM \"properties\" ORDER BY \"account\" ASC LIMIT 25 OFFSET 0");
        assert!(sql.params.is_empty());
        assert_eq!(listing.to_count_sql().unwrap().query, "SELECT COUNT(*) AS count FROM \"properties\"");
    }

    #[test]
    fn search_and_checked_in_combine_with_and() {
        let listing = Listing::new(PROPERTY_LISTING, &query(Some(2), Some(10), Some("  Main St "), Some(true)), &config()).unwrap();
        let sql = listing.to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"properties\" WHERE (\"account\" ILIKE $1 OR \"service_address\" ILIKE $1 OR \"customer_name\" ILIKE $1 OR \"owner_name\" ILIKE $1 OR \"resident_name\" ILIKE $1) AND \"checked_in\" = $2 ORDER BY \"account\" ASC LIMIT 10 OFFSET 10"
        );
        assert_eq!(sql.params, vec![Value::String("%Main St%".into()), Value::Bool(true)]);
    }

    #[test]
    fn count_query_uses_identical_predicate_and_params() {
        let listing = Listing::new(SHAREHOLDER_LISTING, &query(Some(3), None, Some("ann"), Some(false)), &config()).unwrap();
        let list = listing.to_sql().unwrap();
        let count = listing.to_count_sql().unwrap();

        let marker = "FROM \"shareholders\" WHERE ";
        let list_where = list.query.split(marker).nth(1).unwrap().split(" ORDER BY ").next().unwrap();
        let count_where = count.query.split(marker).nth(1).unwrap();
        assert_eq!(list_where.trim(), count_where.trim());
        assert_eq!(list.params, count.params);
    }

    #[test]
    fn blank_search_is_ignored() {
        let listing = Listing::new(PROPERTY_LISTING, &query(None, None, Some("   "), None), &config()).unwrap();
        assert!(!listing.to_sql().unwrap().query.contains("WHERE"));
    }

    #[test]
    fn meeting_filter_is_appended_last() {
        let mut q = query(None, None, None, Some(false));
        q.meeting_id = Some(7);
        let listing = Listing::new(PROPERTY_LISTING, &q, &config()).unwrap();
        let sql = listing.to_count_sql().unwrap();
        assert!(sql.query.ends_with("WHERE \"checked_in\" = $1 AND \"meeting_id\" = $2"));
        assert_eq!(sql.params, vec![Value::Bool(false), Value::from(7)]);
    }

    #[test]
    fn page_size_is_capped_and_defaulted() {
        let capped = Listing::new(PROPERTY_LISTING, &query(None, Some(10_000), None, None), &config()).unwrap();
        assert_eq!(capped.page_size(), 100);
        let defaulted = Listing::new(PROPERTY_LISTING, &ListingQuery::default(), &config()).unwrap();
        assert_eq!(defaulted.page_size(), 25);
        assert_eq!(defaulted.page(), 1);
    }

    #[test]
    fn rejects_non_positive_page_and_size() {
        assert!(matches!(
            Listing::new(PROPERTY_LISTING, &query(Some(0), None, None, None), &config()),
            Err(FilterError::InvalidPage(_))
        ));
        assert!(matches!(
            Listing::new(PROPERTY_LISTING, &query(None, Some(0), None, None), &config()),
            Err(FilterError::InvalidPageSize(_))
        ));
    }

    #[test]
    fn rejects_page_whose_offset_overflows() {
        assert_eq!(
            Listing::new(PROPERTY_LISTING, &query(Some(i64::MAX), Some(100), None, None), &config()).err(),
            Some(FilterError::InvalidPage("page is too large".to_string()))
        );

        let deep = i64::MAX / 100;
        let listing = Listing::new(PROPERTY_LISTING, &query(Some(deep), Some(100), None, None), &config()).unwrap();
        assert_eq!(listing.offset(), (deep - 1) * 100);
    }
}
