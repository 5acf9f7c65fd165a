use natalis_core::RateLimitConfig;
use natalis_db::BirthRecordRepository;
use std::sync::Arc;

use crate::middleware::EndpointRateLimiter;
use crate::services::RetentionService;

/// Shared application state, handed to handlers as `State<Arc<AppState>>`
#[derive(Clone)]
pub struct AppState {
    pub repository: BirthRecordRepository,
    pub retention: Arc<RetentionService>,
    pub rate_limiter: Arc<EndpointRateLimiter>,
    pub rate_limits: RateLimitConfig,
}
