//! Service paths.

use crate::error::ErrorContext;
use crate::{Error, Result};

pub const STYLES: &str = "/api/v1/styles";
pub const MODELS: &str = "/api/v1/models";
pub const QUEUE: &str = "/api/v1/generate/queue";
pub const GENERATE: &str = "/api/v1/generate";
pub const IMG2IMG: &str = "/api/v1/generate/img2img";
pub const HEALTH: &str = "/health";

/// Poll path for one job.
///
/// Job ids are opaque, but they are spliced into a path, so anything that
/// would change the path structure is refused.
pub fn job_status_path(job_id: &str) -> Result<String> {
    let valid = !job_id.is_empty()
        && !job_id
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#' | '%'));
    if !valid {
        return Err(Error::protocol(
            format!("Invalid job id: {:?}", job_id),
            ErrorContext::new().with_job_id(job_id),
        ));
    }
    Ok(format!("{}/{}", QUEUE, job_id))
}
