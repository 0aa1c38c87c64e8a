//! Job submission: one POST that creates a queued job.

use super::error_normalizer::error_from_response;
use crate::error::ErrorContext;
use crate::transport::{HttpTransport, Method};
use crate::types::job::{JobHandle, SubmitResponse, SubmittedJob};
use crate::{Error, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

const OPERATION: &str = "submit_job";

pub struct JobSubmitter<'a> {
    transport: &'a HttpTransport,
    timeout: Duration,
}

impl<'a> JobSubmitter<'a> {
    pub fn new(transport: &'a HttpTransport, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Create a job at `path` and return its handle and initial status.
    pub async fn submit<R: Serialize>(&self, path: &str, request: &R) -> Result<SubmittedJob> {
        let body = serde_json::to_value(request)?;
        let resp = self
            .transport
            .call(Method::Post, path, Some(&body), self.timeout)
            .await
            .map_err(|e| {
                Error::from_transport(e, ErrorContext::new().with_operation(OPERATION))
            })?;

        if !resp.is_success() {
            return Err(error_from_response(&resp, OPERATION, "Failed to submit generation job"));
        }

        let context = || {
            ErrorContext::new()
                .with_http_status(resp.status)
                .with_operation(OPERATION)
        };
        let decoded: SubmitResponse = resp.json().map_err(|e| {
            Error::protocol(format!("Invalid job submission response: {}", e), context())
        })?;

        let job_id = decoded
            .job_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::protocol("Job submission response has no job id", context()))?;

        let status = decoded.initial_status();
        info!(job_id, status = status.name(), position = ?decoded.position, "job submitted");

        Ok(SubmittedJob {
            handle: JobHandle::new(job_id),
            status,
        })
    }
}
