//! Route configuration and setup.
//!
//! Every public endpoint runs the same ordered chain: its rate-limit bucket
//! (route layer), then request extraction and validation, then the handler.
//! Health probes and the OpenAPI document are not rate limited.

pub mod health;

use crate::handlers::{landing, records};
use crate::middleware::rate_limit::{rate_limit_middleware, RateLimitGuard};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, MethodRouter},
    Json, Router,
};
use natalis_core::{Config, Endpoint};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Submissions are a handful of short fields
const MAX_BODY_BYTES: usize = 16 * 1024;
const DEFAULT_CONCURRENCY_LIMIT: usize = 1_024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_CONCURRENCY_LIMIT)
        .max(1);
    tracing::info!(http_concurrency_limit, "HTTP concurrency limit layer enabled");

    let app = Router::new()
        .route(
            "/",
            rate_limited(get(landing::landing), &state, Endpoint::Landing),
        )
        .route(
            "/save-data/",
            rate_limited(post(records::save_data), &state, Endpoint::Submit),
        )
        .route(
            "/search/",
            rate_limited(get(records::search), &state, Endpoint::Search),
        )
        .route(
            "/delete-old-entries/",
            rate_limited(delete(records::delete_old_entries), &state, Endpoint::Purge),
        )
        .route("/health", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

/// Put a route behind its endpoint's fixed-window bucket
fn rate_limited(
    route: MethodRouter<Arc<AppState>>,
    state: &AppState,
    endpoint: Endpoint,
) -> MethodRouter<Arc<AppState>> {
    let guard = RateLimitGuard::new(
        state.rate_limiter.clone(),
        endpoint,
        state.rate_limits.rule_for(endpoint),
    );
    route.route_layer(axum::middleware::from_fn_with_state(
        guard,
        rate_limit_middleware,
    ))
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_rejects_invalid_origin() {
        let config = Config {
            cors_origins: vec!["https://ok.example".to_string(), "bad\norigin".to_string()],
            ..Config::default()
        };
        assert!(setup_cors(&config).is_err());
    }

    #[test]
    fn test_cors_accepts_explicit_origins() {
        let config = Config {
            cors_origins: vec!["https://registry.example".to_string()],
            ..Config::default()
        };
        assert!(setup_cors(&config).is_ok());
    }
}
