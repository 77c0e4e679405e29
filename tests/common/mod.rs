#![allow(dead_code)]

use std::net::SocketAddr;

use anyhow::{Context, Result};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::{json, Value};

use shareholder_meeting_api::auth::Claims;
use shareholder_meeting_api::config::AppConfig;
use shareholder_meeting_api::database::schema::ensure_schema;
use shareholder_meeting_api::database::DatabaseManager;
use shareholder_meeting_api::{app, AppState};

pub const SECRET: &str = "integration-test-secret";

/// Nothing listens here; pools pointed at it fail on first use
const UNREACHABLE_DATABASE: &str = "postgres://roll:pw@127.0.0.1:1/meetings";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    staff_token: String,
    admin_token: String,
}

impl TestServer {
    async fn spawn(database_url: &str) -> Result<Self> {
        let mut config = AppConfig::development();
        config.security.jwt_secret = SECRET.to_string();
        config.database.url = Some(database_url.to_string());
        config.database.connection_timeout = 2;
        config.database.max_connections = 4;
        config.api.enable_request_logging = false;

        let state = AppState::from_config(&config).context("failed to build state")?;
        let router = app(state, &config);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            staff_token: token("user_staff", "staff")?,
            admin_token: token("user_admin", "admin")?,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn as_staff(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.staff_token)
    }

    pub fn as_admin(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.admin_token)
    }

    pub async fn get(&self, path: &str) -> Result<(StatusCode, Value)> {
        send(self.as_staff(self.client.get(self.url(path)))).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.as_staff(self.client.post(self.url(path)).json(&body))).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<(StatusCode, Value)> {
        send(self.as_staff(self.client.put(self.url(path)).json(&body))).await
    }

    pub async fn delete(&self, path: &str) -> Result<(StatusCode, Value)> {
        send(self.as_staff(self.client.delete(self.url(path)))).await
    }

    /// Shareholder with `properties` owned accounts; returns the shareholder id
    pub async fn seed_shareholder(&self, name: &str, properties: usize) -> Result<String> {
        let shareholder_id = unique_key("SH");
        let (status, body) = self
            .post("/api/shareholders", json!({ "shareholderId": shareholder_id, "name": name }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "seed shareholder failed: {} {}", status, body);

        for _ in 0..properties {
            let (status, body) = self
                .post(
                    "/api/properties",
                    json!({ "account": unique_key("AC"), "shareholderId": shareholder_id }),
                )
                .await?;
            anyhow::ensure!(status == StatusCode::CREATED, "seed property failed: {} {}", status, body);
        }

        Ok(shareholder_id)
    }
}

pub async fn send(request: RequestBuilder) -> Result<(StatusCode, Value)> {
    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;
    let body = if text.is_empty() { Value::Null } else { serde_json::from_str(&text)? };
    Ok((status, body))
}

pub fn token(sub: &str, role: &str) -> Result<String> {
    token_with_ttl(sub, role, 600)
}

pub fn token_with_ttl(sub: &str, role: &str, ttl_secs: i64) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: sub.to_string(),
        email: Some(format!("{}@district.example", sub)),
        name: None,
        role: role.to_string(),
        exp: now + ttl_secs,
        iat: now,
        iss: None,
    };
    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes()))?)
}

pub fn unique_key(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..12])
}

/// Server whose database is never reachable
pub async fn offline_server() -> Result<TestServer> {
    TestServer::spawn(UNREACHABLE_DATABASE).await
}

/// Pool manager against `DATABASE_URL` with the schema in place; `None` when unset
pub async fn database_manager() -> Result<Option<DatabaseManager>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return Ok(None);
    };

    let mut config = AppConfig::development();
    config.database.url = Some(url);
    let db = DatabaseManager::connect_lazy(&config.database)?;
    ensure_schema(db.pool()).await?;
    Ok(Some(db))
}

/// Server against `DATABASE_URL` with the schema in place; `None` when unset
pub async fn database_server() -> Result<Option<TestServer>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database test");
        return Ok(None);
    };

    let pool = sqlx::PgPool::connect(&url).await.context("failed to connect to DATABASE_URL")?;
    ensure_schema(&pool).await?;
    pool.close().await;

    Ok(Some(TestServer::spawn(&url).await?))
}
