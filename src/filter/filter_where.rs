use serde_json::Value;

use super::error::FilterError;
use super::types::CheckedInPredicate;

/// Accumulates AND-ed predicates and the positional params they reference.
pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<String>,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    /// Case-insensitive substring match on any of `columns`. All columns share one param.
    pub fn search_any(&mut self, columns: &[&str], term: &str) -> Result<&mut Self, FilterError> {
        if columns.is_empty() {
            return Ok(self);
        }
        for column in columns {
            validate_column(column)?;
        }
        let placeholder = self.param(Value::String(format!("%{}%", escape_like(term))));
        let parts: Vec<String> = columns
            .iter()
            .map(|c| format!("\"{}\" ILIKE {}", c, placeholder))
            .collect();
        self.conditions.push(format!("({})", parts.join(" OR ")));
        Ok(self)
    }

    pub fn eq(&mut self, column: &str, value: Value) -> Result<&mut Self, FilterError> {
        validate_column(column)?;
        if value.is_null() {
            self.conditions.push(format!("\"{}\" IS NULL", column));
        } else {
            let placeholder = self.param(value);
            self.conditions.push(format!("\"{}\" = {}", column, placeholder));
        }
        Ok(self)
    }

    pub fn checked_in(&mut self, predicate: CheckedInPredicate, checked_in: bool) -> Result<&mut Self, FilterError> {
        match predicate {
            CheckedInPredicate::Column(column) => self.eq(column, Value::Bool(checked_in)),
            CheckedInPredicate::PropertyExists { table, key_column } => {
                validate_column(table)?;
                validate_column(key_column)?;
                let exists = format!(
                    "EXISTS (SELECT 1 FROM \"properties\" p WHERE p.\"shareholder_id\" = \"{}\".\"{}\" AND p.\"checked_in\" = TRUE)",
                    table, key_column
                );
                self.conditions.push(if checked_in { exists } else { format!("NOT {}", exists) });
                Ok(self)
            }
        }
    }

    /// Returns the WHERE body (empty when no predicates) and its params
    pub fn build(self) -> (String, Vec<Value>) {
        (self.conditions.join(" AND "), self.param_values)
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

pub(crate) fn validate_column(column: &str) -> Result<(), FilterError> {
    let mut chars = column.chars();
    let valid_start = chars.next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false);
    if !valid_start || !column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(FilterError::InvalidColumn(format!("Invalid column name format: {}", column)));
    }
    Ok(())
}

/// Escape LIKE metacharacters so a search term matches literally
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_shares_one_placeholder_across_columns() {
        let mut w = FilterWhere::new(0);
        w.search_any(&["account", "owner_name"], "smith").unwrap();
        let (sql, params) = w.build();
        assert_eq!(sql, "(\"account\" ILIKE $1 OR \"owner_name\" ILIKE $1)");
        assert_eq!(params, vec![Value::String("%smith%".into())]);
    }

    #[test]
    fn predicates_are_anded_with_sequential_indices() {
        let mut w = FilterWhere::new(0);
        w.search_any(&["account"], "12").unwrap();
        w.eq("checked_in", Value::Bool(true)).unwrap();
        w.eq("meeting_id", Value::from(4)).unwrap();
        let (sql, params) = w.build();
        assert_eq!(
            sql,
            "(\"account\" ILIKE $1) AND \"checked_in\" = $2 AND \"meeting_id\" = $3"
        );
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn starting_index_offsets_placeholders() {
        let mut w = FilterWhere::new(2);
        w.eq("year", Value::from(2025)).unwrap();
        assert_eq!(w.build().0, "\"year\" = $3");
    }

    #[test]
    fn like_metacharacters_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[test]
    fn rejects_injected_column_names() {
        let mut w = FilterWhere::new(0);
        assert!(w.eq("name; DROP TABLE properties", Value::Null).is_err());
        assert!(w.search_any(&["1abc"], "x").is_err());
    }

    #[test]
    fn shareholder_checked_in_uses_exists_subquery() {
        let mut w = FilterWhere::new(0);
        w.checked_in(CheckedInPredicate::PropertyExists { table: "shareholders", key_column: "shareholder_id" }, false)
            .unwrap();
        let (sql, params) = w.build();
        assert!(sql.starts_with("NOT EXISTS (SELECT 1 FROM \"properties\" p"));
        // outer key must be table-qualified or it would bind to the subquery's own column
        assert!(sql.contains("p.\"shareholder_id\" = \"shareholders\".\"shareholder_id\""));
        assert!(params.is_empty());
    }
}
