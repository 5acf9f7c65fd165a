//! Configuration module
//!
//! Server, database, retention, and per-endpoint rate limit settings, read from the
//! environment (with `.env` support).

use std::env;
use std::str::FromStr;

use crate::rate_limit::{Endpoint, RateLimitConfig, RateLimitRule};

// Common constants
const SERVER_PORT: u16 = 8000;
const DATABASE_URL: &str = "sqlite://births.db";
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const RETENTION_DAYS: i64 = 30;
const PURGE_INTERVAL_SECS: u64 = 86_400;
const MAX_RETENTION_DAYS: i64 = 36_500;
const MAX_RATE_LIMIT_PERIOD_SECS: u64 = 366 * 86_400;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Records older than this many days are eligible for purge.
    pub retention_days: i64,
    /// Interval of the background purge task. 0 = disabled.
    pub purge_interval_secs: u64,
    pub rate_limits: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            database_url: DATABASE_URL.to_string(),
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            retention_days: RETENTION_DAYS,
            purge_interval_secs: PURGE_INTERVAL_SECS,
            rate_limits: RateLimitConfig::default(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn rate_limit_env_key(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Landing => "RATE_LIMIT_LANDING",
        Endpoint::Submit => "RATE_LIMIT_SUBMIT",
        Endpoint::Search => "RATE_LIMIT_SEARCH",
        Endpoint::Purge => "RATE_LIMIT_PURGE",
    }
}

fn rate_limit_from_env(endpoint: Endpoint, default: RateLimitRule) -> Result<RateLimitRule, anyhow::Error> {
    match env::var(rate_limit_env_key(endpoint)) {
        Ok(raw) => raw.parse::<RateLimitRule>().map_err(|e| {
            anyhow::anyhow!("{}: {}", rate_limit_env_key(endpoint), e)
        }),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = Config::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| defaults.environment.clone());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let mut rate_limits = defaults.rate_limits;
        rate_limits.landing = rate_limit_from_env(Endpoint::Landing, rate_limits.landing)?;
        rate_limits.submit = rate_limit_from_env(Endpoint::Submit, rate_limits.submit)?;
        rate_limits.search = rate_limit_from_env(Endpoint::Search, rate_limits.search)?;
        rate_limits.purge = rate_limit_from_env(Endpoint::Purge, rate_limits.purge)?;

        let config = Config {
            server_port: env_or("PORT", defaults.server_port),
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: env_or("DB_MAX_CONNECTIONS", defaults.db_max_connections),
            db_timeout_seconds: env_or("DB_TIMEOUT_SECONDS", defaults.db_timeout_seconds),
            cors_origins,
            environment,
            retention_days: env_or("RETENTION_DAYS", defaults.retention_days),
            purge_interval_secs: env_or("PURGE_INTERVAL_SECS", defaults.purge_interval_secs),
            rate_limits,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a SQLite connection string (sqlite://...)"
            ));
        }

        if self.db_max_connections == 0 {
            return Err(anyhow::anyhow!("Database max connections cannot be 0"));
        }

        if self.db_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Database timeout cannot be 0"));
        }

        if self.retention_days <= 0 || self.retention_days > MAX_RETENTION_DAYS {
            return Err(anyhow::anyhow!(
                "RETENTION_DAYS must be between 1 and {}",
                MAX_RETENTION_DAYS
            ));
        }

        for endpoint in Endpoint::ALL {
            let rule = self.rate_limits.rule_for(endpoint);
            if rule.limit == 0 {
                return Err(anyhow::anyhow!("Rate limit for {} cannot be 0", endpoint));
            }
            if rule.period.is_zero() {
                return Err(anyhow::anyhow!(
                    "Rate limit period for {} cannot be 0",
                    endpoint
                ));
            }
            if rule.period.as_secs() > MAX_RATE_LIMIT_PERIOD_SECS {
                return Err(anyhow::anyhow!(
                    "Rate limit period for {} cannot exceed {} seconds",
                    endpoint,
                    MAX_RATE_LIMIT_PERIOD_SECS
                ));
            }
        }

        Ok(())
    }
}
