//! Rate limit configuration types.
//!
//! Each logical endpoint owns a fixed-window rule. Rules are plain configuration;
//! the counting itself lives in the HTTP layer.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Logical endpoints that are throttled independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Landing,
    Submit,
    Search,
    Purge,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Landing,
        Endpoint::Submit,
        Endpoint::Search,
        Endpoint::Purge,
    ];

    /// Bucket key used by the rate limiter and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Landing => "landing",
            Endpoint::Submit => "save_data",
            Endpoint::Search => "search",
            Endpoint::Purge => "delete_old_entries",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-window rule: at most `limit` calls per `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub limit: u32,
    pub period: Duration,
}

impl RateLimitRule {
    pub const fn new(limit: u32, period_secs: u64) -> Self {
        Self {
            limit,
            period: Duration::from_secs(period_secs),
        }
    }
}

impl fmt::Display for RateLimitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.limit, self.period.as_secs())
    }
}

/// Parses `<calls>/<seconds>`, e.g. `10/60`.
impl FromStr for RateLimitRule {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (calls, secs) = s
            .split_once('/')
            .ok_or_else(|| anyhow::anyhow!("Rate limit '{}' must look like <calls>/<seconds>", s))?;
        let limit = calls
            .trim()
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("Invalid call count in rate limit '{}': {}", s, e))?;
        let period_secs = secs
            .trim()
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("Invalid period in rate limit '{}': {}", s, e))?;
        Ok(Self::new(limit, period_secs))
    }
}

/// Per-endpoint rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub landing: RateLimitRule,
    pub submit: RateLimitRule,
    pub search: RateLimitRule,
    pub purge: RateLimitRule,
}

impl RateLimitConfig {
    pub fn rule_for(&self, endpoint: Endpoint) -> RateLimitRule {
        match endpoint {
            Endpoint::Landing => self.landing,
            Endpoint::Submit => self.submit,
            Endpoint::Search => self.search,
            Endpoint::Purge => self.purge,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            landing: RateLimitRule::new(100, 60),
            submit: RateLimitRule::new(10, 60),
            search: RateLimitRule::new(20, 60),
            purge: RateLimitRule::new(5, 3600),
        }
    }
}
