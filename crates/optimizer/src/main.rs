//! Carbon Optimizer - carbon-aware placement and scheduling service
//!
//! Serves region rankings, emission estimates and low-carbon scheduling
//! windows over HTTP, backed by live grid telemetry when a credential is
//! configured and by static estimates otherwise.

use anyhow::Result;
use carbon_optimizer::{api, config::ServiceConfig};
use optimizer_lib::{
    health::{components, HealthRegistry},
    observability::{EngineMetrics, StructuredLogger},
    CarbonEngine,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVICE_NAME: &str = "carbon-optimizer";
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting {}", SERVICE_NAME);

    let config = ServiceConfig::load()?;
    let engine_config = config.engine_config();
    info!(
        api_port = config.api_port,
        api_base_url = %config.api_base_url,
        cache_capacity = config.cache_capacity,
        "Service configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::TELEMETRY).await;
    health_registry.register(components::CATALOG).await;
    health_registry.register(components::API).await;

    let metrics = EngineMetrics::new();
    let logger = StructuredLogger::new(SERVICE_NAME);

    let engine = match CarbonEngine::builder()
        .config(engine_config.clone())
        .health(health_registry.clone())
        .logger(logger.clone())
        .build()
    {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "Failed to initialize engine");
            health_registry
                .set_unhealthy(components::CATALOG, e.to_string())
                .await;
            return Err(e.into());
        }
    };

    if !engine_config.has_credential() {
        health_registry
            .set_degraded(components::TELEMETRY, "No credential, serving fallback estimates")
            .await;
    }
    logger.log_startup(
        SERVICE_VERSION,
        engine_config.has_credential(),
        engine.catalog().region_count(),
    );

    let app_state = Arc::new(api::AppState::new(
        Arc::new(engine),
        health_registry.clone(),
        metrics,
    ));

    health_registry.set_ready(true).await;

    let api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    tokio::select! {
        result = api_handle => {
            let reason = match result {
                Ok(Ok(())) => "API server exited".to_string(),
                Ok(Err(e)) => format!("API server failed: {}", e),
                Err(e) => format!("API server task panicked: {}", e),
            };
            health_registry.set_unhealthy(components::API, reason.clone()).await;
            logger.log_shutdown(&reason);
            anyhow::bail!(reason);
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
            info!("Shutting down");
        }
    }

    Ok(())
}
