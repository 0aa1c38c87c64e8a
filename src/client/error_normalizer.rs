//! Error body normalization.
//!
//! Non-2xx bodies from the service come in several shapes. They are first
//! classified into an [`ErrorPayload`] and then rendered to a single
//! message. Classification order is fixed: the validation-issue list wins
//! over the `error`/`details` pair, which wins over the scalar `detail`
//! and `error` fields, because more than one of these may be present in
//! the same body and the list forms carry more information.

use crate::error::ErrorContext;
use crate::transport::HttpResponse;
use crate::Error;
use serde::Deserialize;
use serde_json::Value;

const VALIDATION_ISSUE_FALLBACK: &str = "Validation error";

/// Known server error shapes, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPayload {
    /// `{"detail": [{"msg": ...}, ...]}`
    ValidationIssues(Vec<String>),
    /// `{"error": ..., "details": [...]}`
    Application { error: String, details: Vec<String> },
    /// `{"detail": "..."}`
    Detail(String),
    /// `{"error": "..."}`
    Error(String),
    /// Anything else, including bodies that are not JSON.
    Unrecognized,
}

/// The single error shape every failure body converges to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    pub message: String,
    pub payload: ErrorPayload,
}

#[derive(Debug, Default, Deserialize)]
struct RawErrorBody {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    details: Option<Value>,
}

impl ErrorPayload {
    pub fn classify(body: &Value) -> Self {
        let raw: RawErrorBody = serde_json::from_value(body.clone()).unwrap_or_default();

        match (&raw.detail, &raw.error, &raw.details) {
            (Some(Value::Array(issues)), _, _) if !issues.is_empty() => {
                ErrorPayload::ValidationIssues(
                    issues
                        .iter()
                        .map(|issue| {
                            issue
                                .get("msg")
                                .and_then(Value::as_str)
                                .unwrap_or(VALIDATION_ISSUE_FALLBACK)
                                .to_string()
                        })
                        .collect(),
                )
            }
            (_, Some(error), Some(Value::Array(details)))
                if !error.is_null() && details.iter().any(|d| value_text(d).is_some()) =>
            {
                ErrorPayload::Application {
                    error: value_text(error).unwrap_or_default(),
                    details: details.iter().filter_map(value_text).collect(),
                }
            }
            (Some(detail), _, _) if value_text(detail).is_some() => {
                ErrorPayload::Detail(value_text(detail).unwrap_or_default())
            }
            (_, Some(error), _) if value_text(error).is_some() => {
                ErrorPayload::Error(value_text(error).unwrap_or_default())
            }
            _ => ErrorPayload::Unrecognized,
        }
    }

    /// Render the payload; `fallback` is used when nothing usable was found.
    pub fn message(&self, fallback: &str) -> String {
        match self {
            ErrorPayload::ValidationIssues(issues) => issues.join(", "),
            ErrorPayload::Application { details, .. } => details.join(", "),
            ErrorPayload::Detail(msg) | ErrorPayload::Error(msg) => msg.clone(),
            ErrorPayload::Unrecognized => fallback.to_string(),
        }
    }
}

/// Scalar text of a field; objects contribute their `message` if they have one.
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null | Value::Array(_) => return None,
        Value::String(s) => s.clone(),
        Value::Object(map) => map.get("message").and_then(Value::as_str)?.to_string(),
        other => other.to_string(),
    };
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Normalize a raw error body.
///
/// `fallback` is the caller's "Failed to <operation>" message.
pub fn normalize(body: &str, fallback: &str) -> NormalizedError {
    let payload = serde_json::from_str::<Value>(body)
        .map(|v| ErrorPayload::classify(&v))
        .unwrap_or(ErrorPayload::Unrecognized);
    NormalizedError {
        message: payload.message(fallback),
        payload,
    }
}

/// Turn a non-2xx response into a client error.
pub(crate) fn error_from_response(
    response: &HttpResponse,
    operation: &str,
    fallback: &str,
) -> Error {
    let normalized = normalize(&response.body, fallback);
    let context = ErrorContext::new()
        .with_http_status(response.status)
        .with_operation(operation);
    tracing::warn!(
        operation,
        http_status = response.status,
        message = %normalized.message,
        "service rejected request"
    );
    match normalized.payload {
        ErrorPayload::ValidationIssues(_) => Error::Validation {
            message: normalized.message,
            context,
        },
        _ => Error::Application {
            message: normalized.message,
            context,
        },
    }
}
