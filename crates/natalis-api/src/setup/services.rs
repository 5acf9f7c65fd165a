//! Service and repository wiring

use crate::middleware::EndpointRateLimiter;
use crate::services::RetentionService;
use crate::state::AppState;
use natalis_core::Config;
use natalis_db::BirthRecordRepository;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Build the shared state from an open pool
pub fn initialize_services(config: &Config, pool: SqlitePool) -> Arc<AppState> {
    let repository = BirthRecordRepository::new(pool);
    let retention = Arc::new(RetentionService::new(
        repository.clone(),
        config.retention_days,
    ));

    tracing::info!(
        retention_days = config.retention_days,
        landing = %config.rate_limits.landing,
        submit = %config.rate_limits.submit,
        search = %config.rate_limits.search,
        purge = %config.rate_limits.purge,
        "Services initialized"
    );

    Arc::new(AppState {
        repository,
        retention,
        rate_limiter: Arc::new(EndpointRateLimiter::new()),
        rate_limits: config.rate_limits,
    })
}
