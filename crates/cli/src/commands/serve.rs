use anyhow::Result;
use leadmatch_core::env_config::env_non_empty;
use leadmatch_http::{AppState, create_router};
use leadmatch_service::{CompetitorService, GapService, ImportService};
use leadmatch_storage::StorageBackend;
use std::sync::Arc;

pub(crate) async fn run(port: u16, host: String) -> Result<()> {
    let database_url = env_non_empty("DATABASE_URL");
    let storage = Arc::new(StorageBackend::connect(database_url.as_deref()).await?);
    tracing::info!(backend = storage.kind(), "storage ready");

    let competitor_service = CompetitorService::from_env();
    if !competitor_service.is_configured() {
        tracing::warn!("SERPER_API_KEY not set, /api/search-competitors will fail");
    }

    let state = Arc::new(AppState {
        import_service: Arc::new(ImportService::new(Arc::clone(&storage))),
        competitor_service: Arc::new(competitor_service),
        gap_service: Arc::new(GapService::new()),
    });

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
    storage.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
