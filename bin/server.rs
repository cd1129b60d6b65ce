// Location Tracker - Web Server
// REST API with Axum

use anyhow::Context;
use location_tracker::api::{build_router, AppState};
use location_tracker::{Settings, SqliteStore};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load(None)?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    settings.ensure_database_dir()?;
    let store = SqliteStore::open(&settings.database_path)?;
    info!(path = %settings.database_path.display(), "database opened");

    let app = build_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(&settings.server_bind)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.server_bind))?;

    info!(addr = %settings.server_bind, "server running, API under /api/locations");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
