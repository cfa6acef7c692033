use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use server::config::AppConfig;
use server::database::init_db;
use server::manager::{CatalogueManager, ManagerOptions};
use server::state::AppState;
use server::store::build_context;
use server::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;
    init_tracing(&config.logging)?;

    let db = if config.needs_database() {
        let db = init_db(&config.database)
            .await
            .context("Failed to connect to database")?;
        info!(pool_size = config.database.pool_size, "Database connected");
        Some(db)
    } else {
        None
    };

    let context = build_context(&config.storage, db.as_ref()).await?;
    let options = ManagerOptions::from(&config.storage);
    info!(
        on_upload_failure = ?options.on_upload_failure,
        max_payload_size = ?options.max_payload_size,
        store_timeout = ?options.store_timeout,
        "Catalogue manager ready"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        manager: Arc::new(CatalogueManager::new(context, options)),
        config,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
