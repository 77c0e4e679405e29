use std::time::Duration;

use anyhow::anyhow;
use reqwest::{Method, StatusCode};
use serde_json::Value;

/// Thin JSON client for the meeting API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, base_url, token })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Option<Value>) -> anyhow::Result<Value> {
        self.send(Method::POST, path, body).await
    }

    pub async fn put(&self, path: &str, body: Value) -> anyhow::Result<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> anyhow::Result<Value> {
        self.send(Method::DELETE, path, None).await
    }

    /// `/health` answers 503 with a body when degraded; return it rather than failing
    pub async fn health(&self) -> anyhow::Result<(bool, Value)> {
        let response = self.http.get(format!("{}/health", self.base_url)).send().await?;
        let ok = response.status().is_success();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((ok, body))
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> anyhow::Result<Value> {
        let mut request = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let text = response.text().await?;
        let value: Value = if text.is_empty() { Value::Null } else { serde_json::from_str(&text).unwrap_or(Value::String(text)) };

        if status.is_success() {
            Ok(value)
        } else {
            Err(anyhow!("{} ({})", error_message(&value), status.as_u16()))
        }
    }
}

fn error_message(body: &Value) -> String {
    match body {
        Value::Object(map) => map
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("request failed")
            .to_string(),
        Value::String(s) => s.clone(),
        _ => "request failed".to_string(),
    }
}
