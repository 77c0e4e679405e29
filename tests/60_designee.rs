mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn designee_set_then_clear() -> Result<()> {
    let Some(server) = common::database_server().await? else { return Ok(()) };
    let id = server.seed_shareholder("Elm Street Trust", 1).await?;
    let path = format!("/api/shareholders/{}/designee", id);

    let (status, body) = server.get(&path).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["designee"], Value::Null);

    let (status, body) = server.put(&path, json!({ "designee": "Pat Quinn" })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["designee"], "Pat Quinn");

    let (_, body) = server.get(&path).await?;
    assert_eq!(body["designee"], "Pat Quinn");

    let (status, _) = server.delete(&path).await?;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = server.get(&path).await?;
    assert_eq!(body["designee"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn designee_text_is_stored_as_sent() -> Result<()> {
    let Some(server) = common::database_server().await? else { return Ok(()) };
    let id = server.seed_shareholder("Hazel Acres", 1).await?;
    let path = format!("/api/shareholders/{}/designee", id);

    let (status, body) = server.put(&path, json!({ "designee": "   " })).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["designee"], "   ");

    let (_, body) = server.get(&path).await?;
    assert_eq!(body["designee"], "   ");

    server.delete(&path).await?;
    let (_, body) = server.get(&path).await?;
    assert_eq!(body["designee"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn comment_is_independent_of_designee() -> Result<()> {
    let Some(server) = common::database_server().await? else { return Ok(()) };
    let id = server.seed_shareholder("Fir Orchard", 1).await?;

    server.put(&format!("/api/shareholders/{}/designee", id), json!({ "designee": "Lee" })).await?;
    let (status, _) = server.put(&format!("/api/shareholders/{}/comment", id), json!({ "comment": "Arrived late" })).await?;
    assert_eq!(status, StatusCode::OK);

    server.delete(&format!("/api/shareholders/{}/comment", id)).await?;

    let (_, detail) = server.get(&format!("/api/shareholders/{}", id)).await?;
    assert_eq!(detail["designee"], "Lee");
    assert_eq!(detail["comment"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn designee_for_unknown_shareholder_is_not_found() -> Result<()> {
    let Some(server) = common::database_server().await? else { return Ok(()) };
    let path = format!("/api/shareholders/{}/designee", common::unique_key("NOPE"));

    let (status, _) = server.put(&path, json!({ "designee": "Someone" })).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
