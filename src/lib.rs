//! # imagegen-client
//!
//! Async client for a queued image-generation service.
//!
//! The service accepts a generation request, answers immediately with a job
//! handle, and the client polls the job until it completes or fails,
//! reporting queue position and processing state to an observer along the
//! way. A direct (non-queued) mode and image-to-image calls are available
//! for deployments without a queue.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imagegen_client::{GenerationRequest, ImageClient, ProgressEvent};
//!
//! #[tokio::main]
//! async fn main() -> imagegen_client::Result<()> {
//!     let client = ImageClient::builder()
//!         .base_url("http://localhost:8000")
//!         .build()?;
//!
//!     let request = GenerationRequest::new("a lighthouse at dusk")
//!         .style("cinematic")
//!         .resolution("768x768");
//!
//!     let result = client
//!         .generate_with_progress(&request, &|e: &ProgressEvent| {
//!             eprintln!("{}", e.status_text);
//!         })
//!         .await?;
//!
//!     println!("{:?}", result.image_url);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Facade, job submission, polling, error normalization |
//! | [`transport`] | Single HTTP calls with a hard per-call deadline |
//! | [`types`] | Requests, job states, catalogs, progress events |
//! | [`config`] | Immutable client configuration and env loading |
//! | [`error`] | Unified error type |

pub mod client;
pub mod config;
pub mod transport;
pub mod types;

pub use client::{ImageClient, ImageClientBuilder};
pub use config::ClientConfig;
pub use types::{
    GenerationRequest, GenerationResult, JobHandle, JobStatus, NoopObserver, ProgressEvent,
    ProgressObserver, QueueStatus, RecordingObserver, Resolution, SubmittedJob, TransformRequest,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
