//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use natalis_core::Config;
use std::sync::Arc;
use std::time::Duration;

/// Initialize the entire application
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.is_production())?;

    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(config).await?;

    let state = services::initialize_services(config, pool);

    if config.purge_interval_secs > 0 {
        state
            .retention
            .clone()
            .start(Duration::from_secs(config.purge_interval_secs));
        tracing::info!(
            interval_secs = config.purge_interval_secs,
            "Background purge task started"
        );
    } else {
        tracing::info!("Background purge task disabled");
    }

    let router = routes::setup_routes(config, state.clone())?;

    Ok((state, router))
}
