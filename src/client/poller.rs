//! Status polling for queued jobs.
//!
//! One status query at a time, a fixed pause before each query, and a
//! single wall-clock deadline for the whole job. `pending` and
//! `processing` are the only states that keep the loop going; everything
//! else ends it.

use super::endpoint;
use super::error_normalizer::normalize;
use crate::error::ErrorContext;
use crate::transport::{HttpTransport, Method};
use crate::types::job::{GenerationResult, JobHandle, JobStatus};
use crate::types::progress::{ProgressEvent, ProgressObserver};
use crate::{Error, Result};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

const OPERATION: &str = "poll_job";
const STATUS_FALLBACK: &str = "Failed to check job status";
const JOB_FAILED_FALLBACK: &str = "Generation failed";

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub budget: Duration,
    pub request_timeout: Duration,
}

pub struct Poller<'a> {
    transport: &'a HttpTransport,
    settings: PollSettings,
}

impl<'a> Poller<'a> {
    pub fn new(transport: &'a HttpTransport, settings: PollSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Poll with a budget starting now.
    pub async fn poll_until_done(
        &self,
        handle: &JobHandle,
        observer: &dyn ProgressObserver,
    ) -> Result<GenerationResult> {
        let deadline = Instant::now() + self.settings.budget;
        self.poll_until(handle, deadline, observer).await
    }

    /// Poll until a terminal state or `deadline`, whichever comes first.
    pub async fn poll_until(
        &self,
        handle: &JobHandle,
        deadline: Instant,
        observer: &dyn ProgressObserver,
    ) -> Result<GenerationResult> {
        let job_id = handle.job_id();
        let started = Instant::now();
        let mut polls: u32 = 0;

        loop {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep(self.settings.interval.min(deadline - now)).await;
            if Instant::now() >= deadline {
                break;
            }

            // The last query of the budget only gets what is left of it.
            let remaining = deadline.saturating_duration_since(Instant::now());
            let budget_bound = remaining < self.settings.request_timeout;
            polls += 1;
            let status = match self
                .query_status(handle, remaining.min(self.settings.request_timeout))
                .await
            {
                Err(Error::Timeout { .. }) if budget_bound => break,
                other => other?,
            };
            debug!(job_id, poll = polls, status = status.name(), "job status observed");

            match status {
                JobStatus::Pending { position } => {
                    observer.on_progress(&ProgressEvent::queued(position));
                }
                JobStatus::Processing => {
                    observer.on_progress(&ProgressEvent::generating());
                }
                JobStatus::Completed {
                    result: Some(result),
                } => {
                    observer.on_progress(&ProgressEvent::complete());
                    info!(
                        job_id,
                        polls,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "job completed"
                    );
                    return Ok(result);
                }
                JobStatus::Completed { result: None } => {
                    warn!(job_id, "job reported completed without a result");
                    return Err(Error::protocol(
                        "Job completed but no result",
                        self.context(job_id),
                    ));
                }
                JobStatus::Failed { error } => {
                    let message = error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| JOB_FAILED_FALLBACK.to_string());
                    warn!(job_id, polls, error = %message, "job failed");
                    return Err(Error::job_failed(message, self.context(job_id)));
                }
            }
        }

        warn!(
            job_id,
            polls,
            budget_ms = self.settings.budget.as_millis() as u64,
            "polling budget exhausted"
        );
        Err(Error::generation_timeout(
            self.settings.budget,
            self.context(job_id),
        ))
    }

    /// Issue a single status query.
    pub async fn fetch_status(&self, handle: &JobHandle) -> Result<JobStatus> {
        self.query_status(handle, self.settings.request_timeout).await
    }

    async fn query_status(&self, handle: &JobHandle, timeout: Duration) -> Result<JobStatus> {
        let job_id = handle.job_id();
        let path = endpoint::job_status_path(job_id)?;
        let resp = self
            .transport
            .call(Method::Get, &path, None, timeout)
            .await
            .map_err(|e| Error::from_transport(e, self.context(job_id)))?;

        // A broken polling channel is not retried.
        if !resp.is_success() {
            let normalized = normalize(&resp.body, STATUS_FALLBACK);
            warn!(job_id, http_status = resp.status, message = %normalized.message, "status query rejected");
            return Err(Error::protocol(
                normalized.message,
                self.context(job_id).with_http_status(resp.status),
            ));
        }

        resp.json::<JobStatus>().map_err(|e| {
            Error::protocol(
                format!("Invalid job status response: {}", e),
                self.context(job_id).with_http_status(resp.status),
            )
        })
    }

    fn context(&self, job_id: &str) -> ErrorContext {
        ErrorContext::new()
            .with_job_id(job_id)
            .with_operation(OPERATION)
    }
}
