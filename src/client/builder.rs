use crate::client::core::ImageClient;
use crate::config::ClientConfig;
use crate::Result;
use std::time::Duration;

/// Builder for clients with custom configuration.
///
/// Starts from [`ClientConfig::default`]; use [`ImageClientBuilder::from_env`]
/// to start from the environment instead.
pub struct ImageClientBuilder {
    config: ClientConfig,
}

impl ImageClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_env(),
        }
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Service root, e.g. `http://localhost:8000`. A trailing `/` is ignored.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Timeout for metadata reads, job submission and each status poll.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Timeout for direct generation and image-to-image calls.
    pub fn direct_timeout(mut self, timeout: Duration) -> Self {
        self.config.direct_timeout = timeout;
        self
    }

    pub fn health_timeout(mut self, timeout: Duration) -> Self {
        self.config.health_timeout = timeout;
        self
    }

    /// Pause before each status query.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Wall-clock budget for a queued job, from submission to terminal state.
    pub fn poll_budget(mut self, budget: Duration) -> Self {
        self.config.poll_budget = budget;
        self
    }

    pub fn pool_max_idle_per_host(mut self, n: usize) -> Self {
        self.config.pool_max_idle_per_host = n;
        self
    }

    pub fn proxy_url(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy_url = Some(proxy_url.into());
        self
    }

    pub fn build(self) -> Result<ImageClient> {
        let mut config = self.config;
        config.base_url = config.base_url.trim().trim_end_matches('/').to_string();
        ImageClient::new(config)
    }
}

impl Default for ImageClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
