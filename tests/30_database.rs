mod common;

use anyhow::Result;
use serde_json::{json, Value};
use sqlx::Row;

#[tokio::test]
async fn query_returns_every_matching_row() -> Result<()> {
    let Some(db) = common::database_manager().await? else { return Ok(()) };
    let tag = common::unique_key("RAW");

    for suffix in ["a", "b"] {
        db.query(
            "INSERT INTO shareholders (shareholder_id, name) VALUES ($1, $2)",
            &[Value::from(format!("{}-{}", tag, suffix)), Value::from("Raw Query Holder")],
        )
        .await?;
    }

    let rows = db
        .query(
            "SELECT shareholder_id FROM shareholders WHERE shareholder_id LIKE $1 ORDER BY shareholder_id",
            &[Value::from(format!("{}-%", tag))],
        )
        .await?;
    let ids: Vec<String> = rows.iter().map(|r| r.try_get("shareholder_id")).collect::<Result<_, _>>()?;
    assert_eq!(ids, vec![format!("{}-a", tag), format!("{}-b", tag)]);
    Ok(())
}

#[tokio::test]
async fn query_one_is_none_for_missing_row() -> Result<()> {
    let Some(db) = common::database_manager().await? else { return Ok(()) };

    let row = db
        .query_one(
            "SELECT name FROM shareholders WHERE shareholder_id = $1",
            &[Value::from(common::unique_key("MISSING"))],
        )
        .await?;
    assert!(row.is_none());
    Ok(())
}

#[tokio::test]
async fn query_one_binds_null_and_integers() -> Result<()> {
    let Some(db) = common::database_manager().await? else { return Ok(()) };
    let id = common::unique_key("NULLS");

    let row = db
        .query_one(
            "INSERT INTO shareholders (shareholder_id, name, designee) VALUES ($1, $2, $3) RETURNING designee",
            &[Value::from(id.as_str()), Value::from("Null Binding"), Value::Null],
        )
        .await?
        .expect("inserted row");
    assert_eq!(row.try_get::<Option<String>, _>("designee")?, None);

    let row = db.query_one("SELECT $1::BIGINT + 1 AS n", &[json!(41)]).await?.expect("one row");
    assert_eq!(row.try_get::<i64, _>("n")?, 42);
    Ok(())
}
