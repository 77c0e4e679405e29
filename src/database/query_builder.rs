use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow, Row};
use std::time::Instant;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::filter::types::SqlResult;

/// Runs a generated statement against the pool, binding its params in order.
pub struct QueryBuilder<'a> {
    db: &'a DatabaseManager,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(db: &'a DatabaseManager) -> Self {
        Self { db }
    }

    pub async fn fetch_all<T>(&self, sql_result: &SqlResult) -> Result<Vec<T>, DatabaseError>
    where
        T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let started = Instant::now();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(self.db.pool()).await?;
        self.db.observe(&sql_result.query, started);
        Ok(rows)
    }

    pub async fn fetch_count(&self, sql_result: &SqlResult) -> Result<i64, DatabaseError> {
        let started = Instant::now();
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(self.db.pool()).await?;
        self.db.observe(&sql_result.query, started);
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }
}

pub(crate) fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // Arrays and objects go over the wire as JSONB
        Value::Array(_) | Value::Object(_) => q.bind(sqlx::types::Json(v)),
    }
}

pub(crate) fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(sqlx::types::Json(v)),
    }
}
