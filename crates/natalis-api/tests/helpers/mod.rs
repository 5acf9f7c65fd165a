//! Test helpers: build AppState and router for integration tests.
//!
//! Each test app gets its own SQLite file in a temp directory.

pub mod fixtures;

use axum_test::TestServer;
use natalis_api::setup::{routes, services};
use natalis_api::state::AppState;
use natalis_core::{Config, RateLimitConfig, RateLimitRule};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Test application: server, shared state, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Limits high enough that only dedicated tests hit them
pub fn generous_limits() -> RateLimitConfig {
    RateLimitConfig {
        landing: RateLimitRule::new(1_000, 60),
        submit: RateLimitRule::new(1_000, 60),
        search: RateLimitRule::new(1_000, 60),
        purge: RateLimitRule::new(1_000, 60),
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_limits(generous_limits()).await
}

/// Setup test app with isolated DB and the given per-endpoint limits.
pub async fn setup_test_app_with_limits(rate_limits: RateLimitConfig) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = Config {
        database_url: format!("sqlite://{}", temp_dir.path().join("births.db").display()),
        db_max_connections: 5,
        purge_interval_secs: 0,
        rate_limits,
        ..Config::default()
    };
    config.validate().expect("Test config should be valid");

    let pool = natalis_db::connect(
        &config.database_url,
        config.db_max_connections,
        Duration::from_secs(config.db_timeout_seconds),
    )
    .await
    .expect("Failed to create test database");
    natalis_db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = services::initialize_services(&config, pool);
    let app = routes::setup_routes(&config, state.clone()).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _temp_dir: temp_dir,
    }
}
