//! Progress notifications for queued jobs.
//!
//! Events are informational only: observers cannot influence polling.

use super::job::JobStatus;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub status_text: String,
    pub position: Option<u32>,
}

impl ProgressEvent {
    pub fn new(status_text: impl Into<String>, position: Option<u32>) -> Self {
        Self {
            status_text: status_text.into(),
            position,
        }
    }

    pub fn queued(position: Option<u32>) -> Self {
        let text = match position {
            Some(p) => format!("In queue - Position: {}", p),
            None => "In queue".to_string(),
        };
        Self::new(text, position)
    }

    pub fn generating() -> Self {
        Self::new("Generating image...", None)
    }

    pub fn complete() -> Self {
        Self::new("Complete!", None)
    }

    /// Event for a non-failed status; `failed` produces no event.
    pub fn for_status(status: &JobStatus) -> Option<Self> {
        match status {
            JobStatus::Pending { position } => Some(Self::queued(*position)),
            JobStatus::Processing => Some(Self::generating()),
            JobStatus::Completed { .. } => Some(Self::complete()),
            JobStatus::Failed { .. } => None,
        }
    }
}

/// Receives progress for one job, in observation order.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn on_progress(&self, _event: &ProgressEvent) {}
}

/// Keeps every event it receives, in order.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn status_texts(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.status_text).collect()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
