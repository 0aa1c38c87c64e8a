//! Core type definitions (requests, job states, catalogs, progress)

pub mod catalog;
pub mod job;
pub mod progress;
pub mod request;

pub use catalog::{ModelsResponse, StylesResponse};
pub use job::{GenerationResult, JobHandle, JobStatus, QueueStatus, SubmittedJob};
pub use progress::{NoopObserver, ProgressEvent, ProgressObserver, RecordingObserver};
pub use request::{GenerationRequest, Resolution, TransformRequest};
