// handlers/public/root.rs - GET / handler

use axum::response::Json;
use serde_json::{json, Value};

/// GET / - service banner and route map
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Shareholder Meeting API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Attendance and property roll for the district's annual shareholder meeting",
        "endpoints": {
            "health": "/health (public)",
            "auth": "/api/auth/whoami (protected)",
            "shareholders": "/api/shareholders[/:shareholder_id[/checkin|/designee|/comment]] (protected)",
            "properties": "/api/properties[/:id[/transfer|/transfers]] (protected)",
            "meetings": "/api/meetings[/:id[/stats|/transfers]] (protected)",
            "progress": "/api/progress (protected, server-sent events)",
            "admin": "/api/admin/* (admin role)"
        }
    }))
}
