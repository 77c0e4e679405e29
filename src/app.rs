use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_admin, require_auth};
use crate::state::AppState;

/// Full router: public routes, token-protected `/api/*`, admin-only `/api/admin/*`
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let protected = Router::new()
        .merge(auth_routes())
        .merge(shareholder_routes())
        .merge(property_routes())
        .merge(meeting_routes())
        .route("/api/progress", get(protected::progress::progress_stream))
        .merge(admin_routes().route_layer(from_fn(require_admin)))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let mut router = Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(protected)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if let Some(cors) = cors_layer(config) {
        router = router.layer(cors);
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/api/auth/whoami", get(protected::auth::whoami))
}

fn shareholder_routes() -> Router<AppState> {
    use protected::{checkin, notes, shareholders};

    Router::new()
        .route(
            "/api/shareholders",
            get(shareholders::shareholder_list).post(shareholders::shareholder_create),
        )
        .route(
            "/api/shareholders/:shareholder_id",
            get(shareholders::shareholder_get)
                .put(shareholders::shareholder_update)
                .delete(shareholders::shareholder_delete),
        )
        .route(
            "/api/shareholders/:shareholder_id/checkin",
            post(checkin::checkin_post).delete(checkin::checkin_delete),
        )
        .route(
            "/api/shareholders/:shareholder_id/designee",
            get(notes::designee_get).put(notes::designee_put).delete(notes::designee_delete),
        )
        .route(
            "/api/shareholders/:shareholder_id/comment",
            get(notes::comment_get).put(notes::comment_put).delete(notes::comment_delete),
        )
}

fn property_routes() -> Router<AppState> {
    use protected::properties;

    Router::new()
        .route(
            "/api/properties",
            get(properties::property_list).post(properties::property_create),
        )
        .route(
            "/api/properties/:id",
            get(properties::property_get)
                .put(properties::property_update)
                .delete(properties::property_delete),
        )
        .route("/api/properties/:id/transfer", post(properties::property_transfer))
        .route("/api/properties/:id/transfers", get(properties::property_transfers))
}

fn meeting_routes() -> Router<AppState> {
    use protected::meetings;

    Router::new()
        .route("/api/meetings", get(meetings::meeting_list))
        .route("/api/meetings/:id", get(meetings::meeting_get))
        .route("/api/meetings/:id/stats", get(meetings::meeting_stats))
        .route("/api/meetings/:id/transfers", get(meetings::meeting_transfers))
}

fn admin_routes() -> Router<AppState> {
    use elevated::{checkins, meetings, progress, schema, users};

    Router::new()
        .route("/api/admin/schema", post(schema::schema_post))
        .route("/api/admin/checkins/reset", post(checkins::checkins_reset))
        .route("/api/admin/progress/connections", get(progress::progress_connections))
        .route("/api/admin/meetings", post(meetings::meeting_create))
        .route("/api/admin/meetings/:id", axum::routing::delete(meetings::meeting_delete))
        .route("/api/admin/meetings/:id/mailers", put(meetings::meeting_mailers))
        .route("/api/admin/meetings/:id/import", post(meetings::meeting_import))
        .route("/api/admin/meetings/:id/snapshots", post(meetings::snapshot_create))
        .route("/api/admin/meetings/:id/changes", get(meetings::meeting_changes))
        .route("/api/admin/users", get(users::user_list).post(users::user_create))
        .route("/api/admin/users/:id/role", put(users::user_role))
        .route("/api/admin/users/:id", axum::routing::delete(users::user_delete))
}

/// Permissive in development, explicit origin list elsewhere
fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }
    if config.environment == Environment::Development {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::{token_for, SECRET};
    use crate::services::identity_service::{IdentityError, IdentityProvider, ManagedUser, NewUser, Role};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FixedIdentity;

    #[async_trait]
    impl IdentityProvider for FixedIdentity {
        async fn list_users(&self) -> Result<Vec<ManagedUser>, IdentityError> {
            Ok(vec![ManagedUser {
                id: "u1".into(),
                email: "clerk@district.example".into(),
                name: Some("Clerk".into()),
                role: "staff".into(),
            }])
        }

        async fn create_user(&self, user: &NewUser, role: Role) -> Result<ManagedUser, IdentityError> {
            Ok(ManagedUser { id: "u2".into(), email: user.email.clone(), name: None, role: role.as_str().into() })
        }

        async fn update_role(&self, user_id: &str, role: Role) -> Result<ManagedUser, IdentityError> {
            Ok(ManagedUser { id: user_id.into(), email: "x@district.example".into(), name: None, role: role.as_str().into() })
        }

        async fn delete_user(&self, _user_id: &str) -> Result<(), IdentityError> {
            Ok(())
        }
    }

    fn config() -> AppConfig {
        let mut config = AppConfig::development();
        config.security.jwt_secret = SECRET.to_string();
        // nothing listens here; only routes that never touch the pool are exercised
        config.database.url = Some("postgres://roll:pw@127.0.0.1:1/meetings".to_string());
        config.database.connection_timeout = 1;
        config.api.max_request_size_bytes = 1024;
        config
    }

    fn router() -> Router {
        let config = config();
        let state = AppState::from_config(&config).unwrap().with_identity(Arc::new(FixedIdentity));
        app(state, &config)
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get_as(uri: &str, role: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(role) = role {
            builder = builder.header("authorization", format!("Bearer {}", token_for(role, 600)));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn root_is_public() {
        let (status, body) = send(get_as("/", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Shareholder Meeting API");
    }

    #[tokio::test]
    async fn api_requires_token() {
        let (status, body) = send(get_as("/api/shareholders", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(body["error"], "Missing Authorization header");
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let request = Request::builder()
            .uri("/api/auth/whoami")
            .header("authorization", format!("Bearer {}", token_for("staff", -3600)))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn whoami_echoes_claims() {
        let (status, body) = send(get_as("/api/auth/whoami", Some("staff"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], "user_staff");
        assert_eq!(body["isAdmin"], false);
    }

    #[tokio::test]
    async fn admin_routes_refuse_staff() {
        let (status, body) = send(get_as("/api/admin/users", Some("staff"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn admin_lists_users_through_provider() {
        let (status, body) = send(get_as("/api/admin/users", Some("admin"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["email"], "clerk@district.example");
    }

    #[tokio::test]
    async fn admin_sees_open_progress_connections() {
        let (status, body) = send(get_as("/api/admin/progress/connections", Some("admin"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["connections"], Value::Array(vec![]));

        let (status, _) = send(get_as("/api/admin/progress/connections", Some("staff"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn invalid_role_is_a_validation_error() {
        let request = Request::builder()
            .method("PUT")
            .uri("/api/admin/users/u1/role")
            .header("authorization", format!("Bearer {}", token_for("admin", 600)))
            .header("content-type", "application/json")
            .body(Body::from(r#"{"role":"owner"}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["fieldErrors"]["role"], "Role must be admin or staff");
    }

    #[tokio::test]
    async fn page_zero_is_rejected_before_querying() {
        let (status, body) = send(get_as("/api/properties?page=0", Some("staff"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid page: page must be 1 or greater");
    }

    #[tokio::test]
    async fn page_past_addressable_offset_is_rejected() {
        let (status, body) = send(get_as("/api/properties?page=9223372036854775807", Some("staff"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid page: page is too large");
    }

    #[tokio::test]
    async fn malformed_query_is_bad_request() {
        let (status, body) = send(get_as("/api/shareholders?checkedIn=maybe", Some("staff"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn designee_body_without_field_is_rejected() {
        let request = Request::builder()
            .method("PUT")
            .uri("/api/shareholders/S-1/designee")
            .header("authorization", format!("Bearer {}", token_for("staff", 600)))
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"Pat Quinn"}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let huge = format!(r#"{{"designee":"{}"}}"#, "x".repeat(4096));
        let request = Request::builder()
            .method("PUT")
            .uri("/api/shareholders/S-1/designee")
            .header("authorization", format!("Bearer {}", token_for("staff", 600)))
            .header("content-type", "application/json")
            .body(Body::from(huge))
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn meeting_year_out_of_range_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/admin/meetings")
            .header("authorization", format!("Bearer {}", token_for("admin", 600)))
            .header("content-type", "application/json")
            .body(Body::from(r#"{"year":1700,"date":"1700-01-01"}"#))
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["fieldErrors"]["year"].is_string());
    }
}
