mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn reset_clears_attendance_but_keeps_notes() -> Result<()> {
    let Some(server) = common::database_server().await? else { return Ok(()) };
    let id = server.seed_shareholder("Grove Irrigation", 2).await?;

    server.put(&format!("/api/shareholders/{}/designee", id), json!({ "designee": "Robin" })).await?;
    server.put(&format!("/api/shareholders/{}/comment", id), json!({ "comment": "Proxy on file" })).await?;
    let (status, _) = server
        .post(&format!("/api/shareholders/{}/checkin", id), json!({ "signature": "R. Grove" }))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = common::send(
        server.as_admin(server.client.post(server.url("/api/admin/checkins/reset"))),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["propertiesReset"].as_u64().unwrap_or(0) >= 2);

    let (_, detail) = server.get(&format!("/api/shareholders/{}", id)).await?;
    assert_eq!(detail["checkedIn"], false);
    assert_eq!(detail["signature"], Value::Null);
    assert_eq!(detail["designee"], "Robin");
    assert_eq!(detail["comment"], "Proxy on file");
    Ok(())
}
