use sqlx::PgPool;
use tracing::info;

use crate::database::manager::DatabaseError;

/// Idempotent DDL in dependency order. Properties reference shareholders by the
/// business key `shareholder_id`, never by the numeric id.
const SCHEMA: &[(&str, &str)] = &[
    (
        "meetings",
        r#"CREATE TABLE IF NOT EXISTS meetings (
            id SERIAL PRIMARY KEY,
            year INTEGER NOT NULL,
            date DATE NOT NULL,
            total_shareholders INTEGER NOT NULL DEFAULT 0,
            checked_in_count INTEGER NOT NULL DEFAULT 0,
            data_source TEXT,
            has_initial_data BOOLEAN NOT NULL DEFAULT FALSE,
            mailers_generated BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "shareholders",
        r#"CREATE TABLE IF NOT EXISTS shareholders (
            id SERIAL PRIMARY KEY,
            shareholder_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            owner_mail_address TEXT,
            owner_city TEXT,
            owner_state TEXT,
            owner_zip TEXT,
            is_new BOOLEAN NOT NULL DEFAULT FALSE,
            designee TEXT,
            comment TEXT,
            signature TEXT,
            signed_at TIMESTAMPTZ,
            meeting_id INTEGER REFERENCES meetings(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "properties",
        r#"CREATE TABLE IF NOT EXISTS properties (
            id SERIAL PRIMARY KEY,
            account TEXT NOT NULL UNIQUE,
            shareholder_id TEXT NOT NULL,
            owner_name TEXT,
            owner_mail_address TEXT,
            owner_city TEXT,
            owner_state TEXT,
            owner_zip TEXT,
            customer_name TEXT,
            customer_mail_address TEXT,
            resident_name TEXT,
            service_address TEXT,
            checked_in BOOLEAN NOT NULL DEFAULT FALSE,
            meeting_id INTEGER REFERENCES meetings(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "properties_shareholder_idx",
        "CREATE INDEX IF NOT EXISTS properties_shareholder_idx ON properties (shareholder_id)",
    ),
    (
        "property_transfers",
        r#"CREATE TABLE IF NOT EXISTS property_transfers (
            id SERIAL PRIMARY KEY,
            property_id INTEGER NOT NULL,
            from_shareholder_id TEXT,
            to_shareholder_id TEXT NOT NULL,
            transfer_date DATE NOT NULL DEFAULT CURRENT_DATE,
            meeting_id INTEGER REFERENCES meetings(id),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "snapshots",
        r#"CREATE TABLE IF NOT EXISTS snapshots (
            id SERIAL PRIMARY KEY,
            meeting_id INTEGER NOT NULL REFERENCES meetings(id),
            data JSONB NOT NULL,
            checksum TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )"#,
    ),
    (
        "snapshots_meeting_idx",
        "CREATE INDEX IF NOT EXISTS snapshots_meeting_idx ON snapshots (meeting_id, created_at DESC)",
    ),
];

/// Names of the objects `ensure_schema` creates, in creation order
pub fn object_names() -> Vec<&'static str> {
    SCHEMA.iter().map(|(name, _)| *name).collect()
}

/// Arbitrary key serializing concurrent schema setup
const SCHEMA_LOCK_KEY: i64 = 0x5348_4d54;

/// Create any missing tables and indexes. Safe to run repeatedly.
pub async fn ensure_schema(pool: &PgPool) -> Result<Vec<&'static str>, DatabaseError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *tx)
        .await?;
    for (_, ddl) in SCHEMA {
        sqlx::query(ddl).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    info!("Schema ensured ({} objects)", SCHEMA.len());
    Ok(object_names())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_is_idempotent() {
        for (name, ddl) in SCHEMA {
            assert!(ddl.contains("IF NOT EXISTS"), "{} is not idempotent", name);
        }
    }

    #[test]
    fn referenced_tables_are_created_first() {
        let names = object_names();
        let pos = |n: &str| names.iter().position(|x| *x == n).unwrap();
        assert!(pos("meetings") < pos("shareholders"));
        assert!(pos("meetings") < pos("properties"));
        assert!(pos("meetings") < pos("snapshots"));
        assert!(pos("properties") < pos("properties_shareholder_idx"));
    }
}
