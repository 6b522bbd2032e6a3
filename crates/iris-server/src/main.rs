//! Iris classifier server
//!
//! Loads the model bundle once at startup and serves the measurement form,
//! the JSON prediction API, health checks and Prometheus metrics.

use iris_lib::{
    health::{components, HealthRegistry},
    observability::{ServiceMetrics, StructuredLogger},
    ArtifactLoader,
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod api;
mod config;
mod page;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    // Load configuration
    let config = config::ServerConfig::load()?;
    info!(
        artifact_path = %config.artifact_path,
        instance = %config.instance_name,
        "Server configured"
    );

    // Initialize logger, health registry and metrics
    let logger = StructuredLogger::new(&config.instance_name);
    let health_registry = HealthRegistry::new();
    let metrics = ServiceMetrics::new();

    // A bundle that cannot be loaded means no prediction is possible
    let loader = ArtifactLoader::new(&config.artifact_path);
    let bundle = match loader.load_bundle() {
        Ok(bundle) => bundle,
        Err(e) => {
            error!(error = %e, path = %config.artifact_path, "Failed to load model bundle");
            return Err(e).context("Model bundle unavailable");
        }
    };

    // Publish the loaded bundle
    logger.log_bundle_loaded(
        &config.artifact_path,
        &bundle.version,
        bundle.model.kind(),
        bundle.num_classes(),
    );
    metrics.set_model_info(bundle.short_version(), bundle.model.kind());
    metrics.set_session_history_size(0);

    // Register health components
    health_registry.register(components::ARTIFACT).await;
    health_registry.register(components::PREDICTOR).await;

    // Create shared application state
    let app_state = Arc::new(api::AppState::new(
        bundle,
        health_registry.clone(),
        metrics,
        logger.clone(),
    ));

    // Mark server as ready once the bundle is in place
    health_registry.set_ready(true).await;

    let listen_addr = config.listen_addr();
    logger.log_startup(SERVER_VERSION, &listen_addr);

    // Serve until Ctrl-C
    let shutdown_logger = logger.clone();
    api::serve(&listen_addr, app_state, async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        shutdown_logger.log_shutdown("SIGINT received");
    })
    .await?;

    info!("Shutting down");
    Ok(())
}
