//! Single bounded-duration HTTP calls.

mod http;

pub use http::{HttpResponse, HttpTransport, Method};

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
