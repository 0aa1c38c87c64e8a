use crate::client::endpoint;
use crate::client::error_normalizer::error_from_response;
use crate::client::poller::{PollSettings, Poller};
use crate::client::submit::JobSubmitter;
use crate::config::ClientConfig;
use crate::error::ErrorContext;
use crate::transport::{HttpTransport, Method};
use crate::types::catalog::{self, ModelsResponse, StylesResponse};
use crate::types::job::{GenerationResult, JobHandle, JobStatus, QueueStatus, SubmittedJob};
use crate::types::progress::{NoopObserver, ProgressEvent, ProgressObserver};
use crate::types::request::{GenerationRequest, TransformRequest};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Client for the generation service.
///
/// Holds no per-job state: concurrent calls on one client (or clones of
/// it) are fully independent.
#[derive(Clone)]
pub struct ImageClient {
    transport: Arc<HttpTransport>,
    config: Arc<ClientConfig>,
}

impl ImageClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config)
            .map_err(|e| Error::configuration(e.to_string()))?;
        Ok(Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        })
    }

    /// Client configured from `IMAGEGEN_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn builder() -> crate::client::builder::ImageClientBuilder {
        crate::client::builder::ImageClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ---- queued generation ----

    /// Generate an image through the job queue.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.generate_with_progress(request, &NoopObserver).await
    }

    /// Generate an image through the job queue, reporting progress to `observer`.
    ///
    /// One event is delivered for the submission (starting queue position),
    /// then one per status observation. The polling budget runs from the
    /// moment of submission. No event is delivered after this returns.
    pub async fn generate_with_progress(
        &self,
        request: &GenerationRequest,
        observer: &dyn ProgressObserver,
    ) -> Result<GenerationResult> {
        request.validate()?;

        let deadline = Instant::now() + self.config.poll_budget;
        let job = self.submit_job(request).await?;
        if let Some(event) = ProgressEvent::for_status(&job.status) {
            observer.on_progress(&event);
        }

        self.poller()
            .poll_until(&job.handle, deadline, observer)
            .await
    }

    /// Submit a job without waiting for it.
    pub async fn submit_job(&self, request: &GenerationRequest) -> Result<SubmittedJob> {
        request.validate()?;
        JobSubmitter::new(&self.transport, self.config.request_timeout)
            .submit(endpoint::QUEUE, request)
            .await
    }

    /// Wait for a previously submitted job, with a fresh polling budget.
    pub async fn wait_for_job(
        &self,
        handle: &JobHandle,
        observer: &dyn ProgressObserver,
    ) -> Result<GenerationResult> {
        self.poller().poll_until_done(handle, observer).await
    }

    /// Single status query for callers that drive their own loop.
    pub async fn job_status(&self, handle: &JobHandle) -> Result<JobStatus> {
        self.poller().fetch_status(handle).await
    }

    // ---- direct (non-queued) calls ----

    /// Generate with one long-lived request, bypassing the queue.
    ///
    /// Intended for low-traffic deployments or when the queue is unavailable.
    /// No progress events are produced.
    pub async fn generate_direct(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        request.validate()?;
        self.post_direct(
            endpoint::GENERATE,
            serde_json::to_value(request)?,
            "generate",
            "Failed to generate image",
        )
        .await
    }

    /// Image-to-image. Always direct; there is no queued path for it.
    pub async fn transform(&self, request: &TransformRequest) -> Result<GenerationResult> {
        request.validate()?;
        self.post_direct(
            endpoint::IMG2IMG,
            serde_json::to_value(request)?,
            "transform",
            "Failed to transform image",
        )
        .await
    }

    // ---- metadata ----

    pub async fn list_styles(&self) -> Result<Vec<String>> {
        let resp: StylesResponse = self
            .get_json(endpoint::STYLES, "list_styles", "Failed to fetch styles")
            .await?;
        Ok(resp.styles)
    }

    pub async fn list_models(&self) -> Result<BTreeMap<String, String>> {
        let resp: ModelsResponse = self
            .get_json(endpoint::MODELS, "list_models", "Failed to fetch models")
            .await?;
        Ok(resp.models)
    }

    /// Styles from the service, or the built-in list if it fails or has none.
    pub async fn list_styles_or_default(&self) -> Vec<String> {
        match self.list_styles().await {
            Ok(styles) if !styles.is_empty() => styles,
            Ok(_) => catalog::default_styles(),
            Err(e) => {
                warn!(error = %e, "using default styles");
                catalog::default_styles()
            }
        }
    }

    /// Text-to-image models from the service, or the built-in map if it
    /// fails or has none.
    pub async fn list_models_or_default(&self) -> BTreeMap<String, String> {
        match self.list_models().await {
            Ok(models) if !models.is_empty() => catalog::text_to_image_models(models),
            Ok(_) => catalog::default_models(),
            Err(e) => {
                warn!(error = %e, "using default models");
                catalog::default_models()
            }
        }
    }

    pub async fn queue_status(&self) -> Result<QueueStatus> {
        self.get_json(endpoint::QUEUE, "queue_status", "Failed to fetch queue status")
            .await
    }

    /// Liveness probe. Never fails: any error reads as `false`.
    pub async fn health(&self) -> bool {
        match self
            .transport
            .call(Method::Get, endpoint::HEALTH, None, self.config.health_timeout)
            .await
        {
            Ok(resp) => {
                if !resp.is_success() {
                    warn!(http_status = resp.status, "health check returned non-success");
                }
                resp.is_success()
            }
            Err(e) => {
                warn!(error = %e, "health check failed");
                false
            }
        }
    }

    // ---- private helpers ----

    fn poller(&self) -> Poller<'_> {
        Poller::new(
            &self.transport,
            PollSettings {
                interval: self.config.poll_interval,
                budget: self.config.poll_budget,
                request_timeout: self.config.request_timeout,
            },
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        operation: &str,
        fallback: &str,
    ) -> Result<T> {
        self.call_json(Method::Get, path, None, self.config.request_timeout, operation, fallback)
            .await
    }

    async fn post_direct(
        &self,
        path: &str,
        body: serde_json::Value,
        operation: &str,
        fallback: &str,
    ) -> Result<GenerationResult> {
        let started = std::time::Instant::now();
        let result: GenerationResult = self
            .call_json(
                Method::Post,
                path,
                Some(&body),
                self.config.direct_timeout,
                operation,
                fallback,
            )
            .await?;
        info!(
            operation,
            success = result.success,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "direct generation finished"
        );
        Ok(result)
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        timeout: Duration,
        operation: &str,
        fallback: &str,
    ) -> Result<T> {
        let resp = self
            .transport
            .call(method, path, body, timeout)
            .await
            .map_err(|e| Error::from_transport(e, ErrorContext::new().with_operation(operation)))?;

        if !resp.is_success() {
            return Err(error_from_response(&resp, operation, fallback));
        }

        resp.json::<T>().map_err(|e| {
            Error::protocol(
                format!("Invalid response from {}: {}", operation, e),
                ErrorContext::new()
                    .with_http_status(resp.status)
                    .with_operation(operation),
            )
        })
    }
}
