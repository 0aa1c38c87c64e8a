//! Client configuration.
//!
//! All knobs live in one immutable [`ClientConfig`] handed to the client at
//! construction, so several clients with different targets can coexist in
//! one process (e.g. a production client next to one aimed at a mock).

use crate::{Error, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Timeout for metadata reads, submission and each status poll.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for direct (non-queued) generation and image-to-image calls.
pub const DEFAULT_DIRECT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Wall-clock budget for a queued job, measured from submission.
pub const DEFAULT_POLL_BUDGET: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub direct_timeout: Duration,
    pub health_timeout: Duration,
    pub poll_interval: Duration,
    pub poll_budget: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            direct_timeout: DEFAULT_DIRECT_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_budget: DEFAULT_POLL_BUDGET,
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            proxy_url: None,
        }
    }
}

impl ClientConfig {
    /// Read configuration from the process environment.
    ///
    /// - `IMAGEGEN_API_URL` (falls back to `API_URL`, then `http://localhost:8000`)
    /// - `IMAGEGEN_HTTP_TIMEOUT_SECS` (default 10)
    /// - `IMAGEGEN_DIRECT_TIMEOUT_SECS` (default 300)
    /// - `IMAGEGEN_HEALTH_TIMEOUT_SECS` (default 5)
    /// - `IMAGEGEN_POLL_INTERVAL_MS` (default 2000)
    /// - `IMAGEGEN_POLL_BUDGET_SECS` (default 300)
    /// - `IMAGEGEN_POOL_MAX_IDLE_PER_HOST` (default 32)
    /// - `IMAGEGEN_PROXY_URL` (unset by default)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading values through `lookup`.
    ///
    /// Unparsable or zero durations fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .filter(|n| *n > 0)
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let base_url = lookup("IMAGEGEN_API_URL")
            .or_else(|| lookup("API_URL"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.base_url);

        let poll_interval = lookup("IMAGEGEN_POLL_INTERVAL_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|n| *n > 0)
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        Self {
            base_url,
            request_timeout: secs("IMAGEGEN_HTTP_TIMEOUT_SECS", defaults.request_timeout),
            direct_timeout: secs("IMAGEGEN_DIRECT_TIMEOUT_SECS", defaults.direct_timeout),
            health_timeout: secs("IMAGEGEN_HEALTH_TIMEOUT_SECS", defaults.health_timeout),
            poll_interval,
            poll_budget: secs("IMAGEGEN_POLL_BUDGET_SECS", defaults.poll_budget),
            pool_max_idle_per_host: lookup("IMAGEGEN_POOL_MAX_IDLE_PER_HOST")
                .and_then(|s| s.trim().parse::<usize>().ok())
                .unwrap_or(defaults.pool_max_idle_per_host),
            pool_idle_timeout: defaults.pool_idle_timeout,
            proxy_url: lookup("IMAGEGEN_PROXY_URL").filter(|s| !s.trim().is_empty()),
        }
    }

    /// Check the settings a client cannot run with.
    pub fn validate(&self) -> Result<()> {
        match url::Url::parse(&self.base_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            Ok(u) => {
                return Err(Error::configuration(format!(
                    "Unsupported base URL scheme '{}': {}",
                    u.scheme(),
                    self.base_url
                )))
            }
            Err(e) => {
                return Err(Error::configuration(format!(
                    "Invalid base URL '{}': {}",
                    self.base_url, e
                )))
            }
        }

        for (name, value) in [
            ("request_timeout", self.request_timeout),
            ("direct_timeout", self.direct_timeout),
            ("health_timeout", self.health_timeout),
            ("poll_interval", self.poll_interval),
            ("poll_budget", self.poll_budget),
        ] {
            if value.is_zero() {
                return Err(Error::configuration(format!("{} must be non-zero", name)));
            }
        }

        if self.poll_interval > self.poll_budget {
            return Err(Error::configuration(
                "poll_interval must not exceed poll_budget",
            ));
        }
        Ok(())
    }
}
