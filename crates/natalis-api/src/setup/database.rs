//! Database setup and initialization

use anyhow::{Context, Result};
use natalis_core::Config;
use sqlx::SqlitePool;
use std::time::Duration;

/// Setup database connection pool and run migrations
pub async fn setup_database(config: &Config) -> Result<SqlitePool> {
    tracing::info!(database_url = %config.database_url, "Connecting to database...");
    let pool = natalis_db::connect(
        &config.database_url,
        config.db_max_connections,
        Duration::from_secs(config.db_timeout_seconds),
    )
    .await
    .context("Failed to open database")?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Database connected successfully"
    );

    natalis_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
