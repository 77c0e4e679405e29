use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::IdentityConfig;
use crate::database::models::FieldErrors;
use crate::error::ApiError;

const ROLE_MESSAGE: &str = "Role must be admin or staff";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Identity provider is not configured")]
    NotConfigured,

    #[error("{0}")]
    NotFound(String),

    #[error("Identity provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Identity provider request failed: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        IdentityError::Upstream(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// An operator account as held by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedUser {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub name: Option<String>,
    pub role: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<Role, ApiError> {
        let mut errors = FieldErrors::default();
        errors.require("email", &self.email);
        if !self.email.trim().is_empty() && !self.email.contains('@') {
            errors.add("email", "Must be an email address");
        }
        let role = Role::parse(&self.role);
        if role.is_none() {
            errors.add("role", ROLE_MESSAGE);
        }
        errors.into_result("Invalid user")?;
        role.ok_or_else(|| ApiError::bad_request(ROLE_MESSAGE))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    pub role: String,
}

impl RoleUpdate {
    pub fn validate(&self) -> Result<Role, ApiError> {
        Role::parse(&self.role).ok_or_else(|| {
            let fields = HashMap::from([("role".to_string(), ROLE_MESSAGE.to_string())]);
            ApiError::validation_error("Invalid role", Some(fields))
        })
    }
}

/// User management delegated to the external identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn list_users(&self) -> Result<Vec<ManagedUser>, IdentityError>;
    async fn create_user(&self, user: &NewUser, role: Role) -> Result<ManagedUser, IdentityError>;
    async fn update_role(&self, user_id: &str, role: Role) -> Result<ManagedUser, IdentityError>;
    async fn delete_user(&self, user_id: &str) -> Result<(), IdentityError>;
}

/// Pick the REST client when a base URL is configured
pub fn provider_from_config(config: &IdentityConfig) -> Arc<dyn IdentityProvider> {
    match (&config.base_url, &config.api_key) {
        (Some(base_url), Some(api_key)) => match RestIdentityProvider::new(base_url, api_key, config.timeout_secs) {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                tracing::error!("Failed to build identity provider client: {}", e);
                Arc::new(UnconfiguredIdentityProvider)
            }
        },
        (Some(_), None) => {
            tracing::warn!("IDENTITY_BASE_URL set without IDENTITY_API_KEY; user management disabled");
            Arc::new(UnconfiguredIdentityProvider)
        }
        _ => Arc::new(UnconfiguredIdentityProvider),
    }
}

pub struct UnconfiguredIdentityProvider;

#[async_trait]
impl IdentityProvider for UnconfiguredIdentityProvider {
    async fn list_users(&self) -> Result<Vec<ManagedUser>, IdentityError> {
        Err(IdentityError::NotConfigured)
    }

    async fn create_user(&self, _user: &NewUser, _role: Role) -> Result<ManagedUser, IdentityError> {
        Err(IdentityError::NotConfigured)
    }

    async fn update_role(&self, _user_id: &str, _role: Role) -> Result<ManagedUser, IdentityError> {
        Err(IdentityError::NotConfigured)
    }

    async fn delete_user(&self, _user_id: &str) -> Result<(), IdentityError> {
        Err(IdentityError::NotConfigured)
    }
}

/// JSON-over-HTTP client for the provider's management API (`/users`)
pub struct RestIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestIdentityProvider {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, IdentityError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(&self, response: reqwest::Response, what: &str) -> Result<reqwest::Response, IdentityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(IdentityError::NotFound(format!("{} not found", what)));
        }
        let message = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            Err(IdentityError::Rejected { status: status.as_u16(), message })
        } else {
            Err(IdentityError::Upstream(format!("{}: {}", status, message)))
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn list_users(&self) -> Result<Vec<ManagedUser>, IdentityError> {
        let response = self.client.get(self.url("/users")).bearer_auth(&self.api_key).send().await?;
        let users = self.check(response, "Users").await?.json::<Vec<ManagedUser>>().await?;
        Ok(users)
    }

    async fn create_user(&self, user: &NewUser, role: Role) -> Result<ManagedUser, IdentityError> {
        let body = NewUser {
            email: user.email.trim().to_string(),
            name: user.name.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            role: role.as_str().to_string(),
        };
        let response = self
            .client
            .post(self.url("/users"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let created = self.check(response, "User").await?.json::<ManagedUser>().await?;
        tracing::info!(user_id = %created.id, role = role.as_str(), "Created user");
        Ok(created)
    }

    async fn update_role(&self, user_id: &str, role: Role) -> Result<ManagedUser, IdentityError> {
        let response = self
            .client
            .put(self.url(&format!("/users/{}/role", user_id)))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({ "role": role.as_str() }))
            .send()
            .await?;
        let updated = self
            .check(response, &format!("User {}", user_id))
            .await?
            .json::<ManagedUser>()
            .await?;
        tracing::info!(user_id, role = role.as_str(), "Updated user role");
        Ok(updated)
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), IdentityError> {
        let response = self
            .client
            .delete(self.url(&format!("/users/{}", user_id)))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        self.check(response, &format!("User {}", user_id)).await?;
        tracing::info!(user_id, "Deleted user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_admin_or_staff() {
        assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
        assert_eq!(Role::parse("staff"), Some(Role::Staff));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn new_user_validation_reports_fields() {
        let bad = NewUser { email: "nobody".into(), name: None, role: "root".into() };
        let body = bad.validate().unwrap_err().to_json();
        assert_eq!(body["fieldErrors"]["email"], "Must be an email address");
        assert_eq!(body["fieldErrors"]["role"], "Role must be admin or staff");

        let good = NewUser { email: "clerk@district.example".into(), name: None, role: "staff".into() };
        assert_eq!(good.validate().unwrap(), Role::Staff);
    }

    #[test]
    fn role_update_rejects_unknown_role() {
        assert!(RoleUpdate { role: "superuser".into() }.validate().is_err());
        assert_eq!(RoleUpdate { role: "admin".into() }.validate().unwrap(), Role::Admin);
    }

    #[tokio::test]
    async fn unconfigured_provider_refuses_every_call() {
        let provider = provider_from_config(&IdentityConfig { base_url: None, api_key: None, timeout_secs: 5 });
        assert!(matches!(provider.list_users().await, Err(IdentityError::NotConfigured)));
        assert!(matches!(provider.delete_user("u1").await, Err(IdentityError::NotConfigured)));
    }

    #[test]
    fn rest_provider_trims_trailing_slash() {
        let provider = RestIdentityProvider::new("https://idp.example/api/", "key", 5).unwrap();
        assert_eq!(provider.url("/users"), "https://idp.example/api/users");
    }
}
