use tracing::info;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{patch, NewProperty, Property, PropertyUpdate};
use crate::database::QueryBuilder;
use crate::filter::{Listing, Page};

pub struct PropertyService {
    db: DatabaseManager,
}

impl PropertyService {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    pub async fn list(&self, listing: &Listing) -> Result<Page<Property>, DatabaseError> {
        let builder = QueryBuilder::new(&self.db);
        let items = builder.fetch_all::<Property>(&listing.to_sql()?).await?;
        let total = builder.fetch_count(&listing.to_count_sql()?).await?;
        Ok(Page::new(items, total, listing.page(), listing.page_size()))
    }

    pub async fn get(&self, id: i32) -> Result<Property, DatabaseError> {
        sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// New properties start unchecked; the owning shareholder must already exist
    pub async fn create(&self, input: NewProperty) -> Result<Property, DatabaseError> {
        let input = input.normalized();

        let owner: Option<(i32,)> = sqlx::query_as("SELECT id FROM shareholders WHERE shareholder_id = $1")
            .bind(&input.shareholder_id)
            .fetch_optional(self.db.pool())
            .await?;
        if owner.is_none() {
            return Err(DatabaseError::NotFound(format!("Shareholder {} not found", input.shareholder_id)));
        }

        let created = sqlx::query_as::<_, Property>(
            r#"INSERT INTO properties
                (account, shareholder_id, owner_name, owner_mail_address, owner_city, owner_state, owner_zip,
                 customer_name, customer_mail_address, resident_name, service_address, meeting_id)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING *"#,
        )
        .bind(&input.account)
        .bind(&input.shareholder_id)
        .bind(&input.owner_name)
        .bind(&input.owner_mail_address)
        .bind(&input.owner_city)
        .bind(&input.owner_state)
        .bind(&input.owner_zip)
        .bind(&input.customer_name)
        .bind(&input.customer_mail_address)
        .bind(&input.resident_name)
        .bind(&input.service_address)
        .bind(input.meeting_id)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| match DatabaseError::from(e) {
            DatabaseError::Conflict(_) => DatabaseError::Conflict(format!("Account {} already exists", input.account)),
            other => other,
        })?;

        info!(property_id = created.id, account = %created.account, "Created property");
        Ok(created)
    }

    pub async fn update(&self, id: i32, update: PropertyUpdate) -> Result<Property, DatabaseError> {
        sqlx::query_as::<_, Property>(
            r#"UPDATE properties SET
                owner_name = NULLIF(COALESCE($2, owner_name), ''),
                owner_mail_address = NULLIF(COALESCE($3, owner_mail_address), ''),
                owner_city = NULLIF(COALESCE($4, owner_city), ''),
                owner_state = NULLIF(COALESCE($5, owner_state), ''),
                owner_zip = NULLIF(COALESCE($6, owner_zip), ''),
                customer_name = NULLIF(COALESCE($7, customer_name), ''),
                customer_mail_address = NULLIF(COALESCE($8, customer_mail_address), ''),
                resident_name = NULLIF(COALESCE($9, resident_name), ''),
                service_address = NULLIF(COALESCE($10, service_address), '')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(patch(&update.owner_name))
        .bind(patch(&update.owner_mail_address))
        .bind(patch(&update.owner_city))
        .bind(patch(&update.owner_state))
        .bind(patch(&update.owner_zip))
        .bind(patch(&update.customer_name))
        .bind(patch(&update.customer_mail_address))
        .bind(patch(&update.resident_name))
        .bind(patch(&update.service_address))
        .fetch_optional(self.db.pool())
        .await?
        .ok_or_else(|| not_found(id))
    }

    pub async fn delete(&self, id: i32) -> Result<Property, DatabaseError> {
        let deleted = sqlx::query_as::<_, Property>("DELETE FROM properties WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| not_found(id))?;
        info!(property_id = id, "Deleted property");
        Ok(deleted)
    }
}

fn not_found(id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("Property {} not found", id))
}
