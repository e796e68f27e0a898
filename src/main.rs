//! promptlift server
//!
//! HTTP service exposing the prompt optimization pipeline

use anyhow::{Context, Result};
use promptlift::config::{AppConfig, Settings};
use promptlift::handlers::{create_router, health};
use promptlift::utils::logging::init_logging;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load settings from environment (.env supported)
    let mut settings = Settings::new().context("Failed to load server settings")?;

    // Initialize logging
    init_logging(&settings.logging);
    info!("{}", promptlift::version_info());

    // Optional JSON file overrides
    if let Some(file_config) = AppConfig::load_default().context("Failed to load configuration file")? {
        settings
            .apply_file_config(&file_config)
            .context("Invalid configuration file")?;
    }

    if !settings.provider.has_credential() {
        warn!(
            "{} is not set, optimizations will use the offline fallback",
            settings.provider.kind.api_key_env()
        );
    }

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let app = create_router(settings)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    health::mark_started();
    info!("promptlift server started on http://{}", addr);
    info!("Health check: http://{}/health", addr);
    info!("Optimize endpoint: http://{}/api/optimize", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start server: {}", e))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
