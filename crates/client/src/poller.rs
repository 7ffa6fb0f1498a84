//! Polling fallback transport.
//!
//! The tracker drives this seam on a fixed interval whenever the push
//! subscription is down. Implementations hit the job status endpoint;
//! tests substitute scripted pollers.

use async_trait::async_trait;
use dpp_core::job::ProgressUpdate;
use dpp_core::types::JobId;

/// A failed poll attempt. Poll failures are soft: the tracker logs them
/// and keeps the last displayed state untouched until the next tick.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("import job {0} not found")]
    NotFound(JobId),
    #[error("server rejected the request: {0}")]
    Rejected(String),
}

/// Fetch the current snapshot of a job's status and progress.
#[async_trait]
pub trait StatusPoller: Send + Sync {
    async fn poll(&self, job_id: JobId) -> Result<ProgressUpdate, PollError>;
}
