use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use natalis_core::{AppError, Endpoint, RateLimitRule};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::HttpAppError;

const DEFAULT_SHARD_COUNT: usize = 4;

/// Counter state of one endpoint's current window
#[derive(Debug, Clone)]
struct FixedWindow {
    count: u32,
    window_start: Instant,
}

impl FixedWindow {
    fn starting_at(now: Instant) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    fn check_and_increment(&mut self, rule: RateLimitRule, now: Instant) -> Result<u32, Duration> {
        if now.duration_since(self.window_start) >= rule.period {
            self.count = 0;
            self.window_start = now;
        }

        if self.count >= rule.limit {
            return Err(self.reset_in(rule, now));
        }

        self.count += 1;
        Ok(rule.limit.saturating_sub(self.count))
    }

    fn reset_in(&self, rule: RateLimitRule, now: Instant) -> Duration {
        match self.window_start.checked_add(rule.period) {
            Some(window_end) => window_end.saturating_duration_since(now),
            None => rule.period,
        }
    }
}

/// Process-wide fixed-window limiter keyed by endpoint name.
///
/// There is no notion of caller identity: every request to an endpoint counts
/// against the same window. Keys are spread over a few shards so unrelated
/// endpoints do not contend on one mutex.
#[derive(Debug)]
pub struct EndpointRateLimiter {
    shards: Vec<Mutex<HashMap<String, FixedWindow>>>,
}

impl Default for EndpointRateLimiter {
    fn default() -> Self {
        Self::with_shards(DEFAULT_SHARD_COUNT)
    }
}

impl EndpointRateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shards(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// Count one call against `key`.
    ///
    /// Returns the calls left in the current window, or the time until the window
    /// resets when the limit is already reached. A rejected call is not counted.
    pub async fn check(&self, key: &str, rule: RateLimitRule) -> Result<u32, Duration> {
        let mut windows = self.shards[self.shard_index(key)].lock().await;
        let now = Instant::now();

        let window = windows
            .entry(key.to_string())
            .or_insert_with(|| FixedWindow::starting_at(now));

        window.check_and_increment(rule, now)
    }
}

/// Middleware state binding one route to its endpoint bucket.
#[derive(Clone)]
pub struct RateLimitGuard {
    pub limiter: Arc<EndpointRateLimiter>,
    pub endpoint: Endpoint,
    pub rule: RateLimitRule,
}

impl RateLimitGuard {
    pub fn new(limiter: Arc<EndpointRateLimiter>, endpoint: Endpoint, rule: RateLimitRule) -> Self {
        Self {
            limiter,
            endpoint,
            rule,
        }
    }
}

fn set_header(response: &mut Response, name: &'static str, value: impl ToString) {
    if let Ok(header_value) = HeaderValue::from_str(&value.to_string()) {
        response.headers_mut().insert(name, header_value);
    }
}

/// Fixed-window rate limiting stage.
///
/// Runs before body extraction, so a throttled request is rejected without being
/// validated or reaching the store.
///
/// # Headers
/// - `X-RateLimit-Limit`: calls allowed per window
/// - `X-RateLimit-Remaining`: calls left in the current window
/// - `Retry-After`: seconds until the window resets (429 only)
pub async fn rate_limit_middleware(
    State(guard): State<RateLimitGuard>,
    request: Request,
    next: Next,
) -> Response {
    let limit = guard.rule.limit;

    match guard.limiter.check(guard.endpoint.as_str(), guard.rule).await {
        Ok(remaining) => {
            let mut response = next.run(request).await;
            set_header(&mut response, "X-RateLimit-Limit", limit);
            set_header(&mut response, "X-RateLimit-Remaining", remaining);
            response
        }
        Err(reset_in) => {
            let retry_after_secs = reset_in.as_secs().max(1);

            // Logged once at warn by HttpAppError
            let mut response = HttpAppError(AppError::RateLimited {
                endpoint: guard.endpoint.to_string(),
                retry_after_secs,
            })
            .into_response();
            set_header(&mut response, "X-RateLimit-Limit", limit);
            set_header(&mut response, "X-RateLimit-Remaining", 0);
            set_header(&mut response, "Retry-After", retry_after_secs);
            response
        }
    }
}
