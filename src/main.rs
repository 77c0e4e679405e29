use anyhow::Context;
use tracing_subscriber::EnvFilter;

use shareholder_meeting_api::{app, config, database::schema::ensure_schema, is_development, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info")),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Shareholder Meeting API in {:?} mode", config.environment);
    if is_development!() {
        tracing::warn!("Development mode: CORS is permissive");
    }
    if config.security.jwt_secret.is_empty() {
        tracing::warn!("SECURITY_JWT_SECRET is not set; every protected request will be rejected");
    }

    let state = AppState::from_config(config).context("failed to configure database pool")?;

    if config.database.ensure_schema_on_start {
        match ensure_schema(state.db.pool()).await {
            Ok(objects) => tracing::info!("Schema ready ({} objects)", objects.len()),
            // keep serving; /health reports the database as degraded
            Err(e) => tracing::error!("Schema setup failed: {}", e),
        }
    }

    let db = state.db.clone();
    let router = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
