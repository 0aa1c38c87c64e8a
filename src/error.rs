use crate::transport::TransportError;
use std::time::Duration;
use thiserror::Error;

/// Structured context attached to an error where the client knows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    /// HTTP status of the response that produced the error, if any.
    pub http_status: Option<u16>,
    /// Job the error relates to (submission or polling).
    pub job_id: Option<String>,
    /// Client operation that failed (e.g. "submit_job", "poll_job").
    pub operation: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

/// Fieldless mirror of [`Error`] for matching on the failure category alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    Network,
    Validation,
    Application,
    Protocol,
    JobFailed,
    InvalidRequest,
    Configuration,
    Serialization,
}

/// Unified error type for the generation client.
///
/// Every failure path (transport, service rejection, contract violation,
/// failed job) converges here. `Display` renders only the human-readable
/// message, so callers can show an error to a user without reformatting it.
#[derive(Debug, Error)]
pub enum Error {
    /// A single call or the whole polling budget ran out of time.
    #[error("{message}")]
    Timeout {
        message: String,
        after: Duration,
        context: ErrorContext,
    },

    /// Transport-level failure unrelated to a timeout.
    #[error("{message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The service rejected the request shape.
    #[error("{message}")]
    Validation {
        message: String,
        context: ErrorContext,
    },

    /// The service returned a structured or plain application failure.
    #[error("{message}")]
    Application {
        message: String,
        context: ErrorContext,
    },

    /// The service answered in a way that violates the job contract.
    #[error("{message}")]
    Protocol {
        message: String,
        context: ErrorContext,
    },

    /// The service marked the job as failed.
    #[error("{message}")]
    JobFailed {
        message: String,
        context: ErrorContext,
    },

    /// Rejected locally before any network call.
    #[error("{message}")]
    InvalidRequest { message: String, field: String },

    #[error("{message}")]
    Configuration { message: String },

    #[error("Invalid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn protocol(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Protocol {
            message: msg.into(),
            context,
        }
    }

    pub fn job_failed(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::JobFailed {
            message: msg.into(),
            context,
        }
    }

    pub fn invalid_request(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: msg.into(),
            field: field.into(),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
        }
    }

    /// Timeout for an individual call, worded with the configured duration.
    pub fn request_timeout(after: Duration, context: ErrorContext) -> Self {
        Error::Timeout {
            message: format!("Request timed out after {}", format_duration(after)),
            after,
            context,
        }
    }

    /// Timeout for the whole polling budget.
    pub fn generation_timeout(after: Duration, context: ErrorContext) -> Self {
        Error::Timeout {
            message: "Generation timed out - please try again".to_string(),
            after,
            context,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::Network { .. } => ErrorKind::Network,
            Error::Validation { .. } => ErrorKind::Validation,
            Error::Application { .. } => ErrorKind::Application,
            Error::Protocol { .. } => ErrorKind::Protocol,
            Error::JobFailed { .. } => ErrorKind::JobFailed,
            Error::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Error::Configuration { .. } => ErrorKind::Configuration,
            Error::Serialization(_) => ErrorKind::Serialization,
        }
    }

    /// Human-readable message, identical to the `Display` output.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Timeout { context, .. }
            | Error::Validation { context, .. }
            | Error::Application { context, .. }
            | Error::Protocol { context, .. }
            | Error::JobFailed { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Whether retrying the same call later could reasonably succeed.
    ///
    /// The client never retries on its own; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Timeout { .. } | Error::Network { .. } => true,
            Error::Application { context, .. } => {
                matches!(context.http_status, Some(s) if s >= 500 || s == 429)
            }
            _ => false,
        }
    }

    pub(crate) fn from_transport(err: TransportError, context: ErrorContext) -> Self {
        match err {
            TransportError::Timeout { after } => Error::request_timeout(after, context),
            TransportError::Network(e) => Error::Network {
                message: format!("Network error: {}", e),
                source: Some(e),
            },
            TransportError::Other(msg) => Error::Network {
                message: msg,
                source: None,
            },
        }
    }
}

fn format_duration(d: Duration) -> String {
    if d.as_millis() % 1000 == 0 {
        let secs = d.as_secs();
        if secs == 1 {
            "1 second".to_string()
        } else {
            format!("{} seconds", secs)
        }
    } else {
        format!("{} ms", d.as_millis())
    }
}
