mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn missing_token_is_unauthorized() -> Result<()> {
    let server = common::offline_server().await?;
    let (status, body) = common::send(server.client.get(server.url("/api/meetings"))).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() -> Result<()> {
    let server = common::offline_server().await?;
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &serde_json::json!({ "sub": "intruder", "role": "admin", "exp": chrono::Utc::now().timestamp() + 600, "iat": 0 }),
        &jsonwebtoken::EncodingKey::from_secret(b"some-other-secret"),
    )?;

    let (status, _) = common::send(server.client.get(server.url("/api/auth/whoami")).bearer_auth(forged)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let server = common::offline_server().await?;
    let expired = common::token_with_ttl("user_staff", "staff", -3600)?;

    let (status, _) = common::send(server.client.get(server.url("/api/auth/whoami")).bearer_auth(expired)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn whoami_reflects_role() -> Result<()> {
    let server = common::offline_server().await?;

    let (status, body) = server.get("/api/auth/whoami").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], "user_staff");
    assert_eq!(body["isAdmin"], false);

    let (status, body) = common::send(server.as_admin(server.client.get(server.url("/api/auth/whoami")))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isAdmin"], true);
    Ok(())
}

#[tokio::test]
async fn staff_cannot_reach_admin_routes() -> Result<()> {
    let server = common::offline_server().await?;
    let (status, body) = server.post("/api/admin/checkins/reset", serde_json::json!({})).await?;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}
