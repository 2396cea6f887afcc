// Banking Registry - Web Server
// REST API with Axum over a single SQLite connection

use anyhow::{Context, Result};
use banking_registry::api::{build_router, AppState};
use banking_registry::{init_logging, open_database, AppConfig, VERSION};
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config);

    let conn = open_database(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path))?;
    info!(path = %config.database_path, "Database opened");

    let app = build_router(AppState::new(conn)).layer(CorsLayer::permissive());

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!(version = VERSION, %addr, "Server running");

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}
