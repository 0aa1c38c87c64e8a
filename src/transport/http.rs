use super::TransportError;
use crate::config::ClientConfig;
use reqwest::Proxy;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A fully-read response: status plus body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        // No client-wide timeout: every call carries its own deadline.
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(config.pool_idle_timeout))
            .tcp_keepalive(Some(Duration::from_secs(30)));

        if let Some(proxy_url) = &config.proxy_url {
            match Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => warn!(proxy = %proxy_url, error = %e, "ignoring invalid proxy url"),
            }
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Perform one call bounded by `timeout`.
    ///
    /// The deadline covers sending the request and reading the whole body.
    /// When it fires, the in-flight exchange is dropped (aborting the
    /// connection) and the timer is released together with it; on every
    /// other exit path the timer is released when `timeout` returns.
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4().to_string();

        let mut req = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };
        if let Some(body) = body {
            req = req.json(body);
        }
        req = req
            .header("accept", "application/json")
            .header("x-request-id", &request_id);

        let start = Instant::now();
        let exchange = async move {
            let resp = req.send().await?;
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            Ok::<_, reqwest::Error>(HttpResponse { status, body })
        };

        let outcome = tokio::time::timeout(timeout, exchange).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(resp)) => {
                debug!(
                    method = method.as_str(),
                    path,
                    http_status = resp.status,
                    elapsed_ms,
                    request_id = %request_id,
                    "request settled"
                );
                Ok(resp)
            }
            Ok(Err(e)) if e.is_timeout() => {
                debug!(method = method.as_str(), path, elapsed_ms, "request timed out in client");
                Err(TransportError::Timeout { after: timeout })
            }
            Ok(Err(e)) => {
                debug!(method = method.as_str(), path, elapsed_ms, error = %e, "request failed");
                Err(TransportError::Network(e))
            }
            Err(_) => {
                debug!(
                    method = method.as_str(),
                    path,
                    timeout_ms = timeout.as_millis() as u64,
                    request_id = %request_id,
                    "request deadline elapsed; aborted"
                );
                Err(TransportError::Timeout { after: timeout })
            }
        }
    }
}
