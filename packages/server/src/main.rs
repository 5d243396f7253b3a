use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemUploadStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::config::AppConfig;
use server::database::init_db;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database.url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;

    let store = FilesystemUploadStore::new(
        &config.storage.uploads_dir,
        config.storage.max_upload_size,
    )
    .await
    .with_context(|| {
        format!(
            "Failed to prepare upload directory {}",
            config.storage.uploads_dir.display()
        )
    })?;
    info!(
        uploads_dir = %store.base_path().display(),
        max_upload_size = config.storage.max_upload_size,
        "Upload store ready"
    );

    let bind = (config.server.host.clone(), config.server.port);

    let state = AppState {
        db,
        store: Arc::new(store),
        config,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind((bind.0.as_str(), bind.1))
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind.0, bind.1))?;
    let addr: SocketAddr = listener.local_addr()?;
    info!("Server running on port {}. http://{}", addr.port(), addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
