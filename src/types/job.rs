//! Job lifecycle types for the queued generation path.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier assigned by the service when a job is accepted.
///
/// Valid from submission until a terminal status is observed; the client
/// never persists it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobHandle {
    job_id: String,
}

impl JobHandle {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.job_id)
    }
}

/// Terminal artifact payload, opaque beyond its shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Status of a queued job as reported by the poll endpoint.
///
/// `pending -> processing -> completed | failed`; the last two are terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Pending {
        /// 1-based queue rank; may move in either direction if the service re-ranks.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<u32>,
    },
    Processing,
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<GenerationResult>,
    },
    Failed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed { .. } | JobStatus::Failed { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobStatus::Pending { .. } => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed { .. } => "completed",
            JobStatus::Failed { .. } => "failed",
        }
    }
}

/// Body of a successful `POST /api/v1/generate/queue`.
///
/// `job_id` is optional here only so that its absence can be reported as
/// a contract violation instead of a decode error.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SubmitResponse {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub position: Option<u32>,
}

impl SubmitResponse {
    pub fn initial_status(&self) -> JobStatus {
        match self.status.as_deref() {
            Some("processing") => JobStatus::Processing,
            _ => JobStatus::Pending {
                position: self.position,
            },
        }
    }
}

/// A job accepted by the service, before any polling.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedJob {
    pub handle: JobHandle,
    pub status: JobStatus,
}

/// Service-wide queue occupancy (informational only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStatus {
    #[serde(default)]
    pub pending: u32,
    #[serde(default)]
    pub processing: u32,
    #[serde(default)]
    pub max_concurrent: u32,
    #[serde(default)]
    pub available_slots: u32,
}
