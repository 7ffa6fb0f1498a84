//! Models for the import job status store.

use dpp_core::error::CoreError;
use dpp_core::job::{ImportJobStatus, ImportProgress};
use dpp_core::types::{DbId, JobId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `import_jobs` table.
///
/// Counters and status are written only by the background
/// validator/committer; this core reads them and performs the two
/// compare-and-set transitions (commit approval, advisory cancel).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportJob {
    pub id: JobId,
    pub brand_id: DbId,
    pub status: String,
    pub filename: String,
    pub processed_rows: i32,
    pub total_rows: i32,
    pub created_rows: i32,
    pub updated_rows: i32,
    pub failed_rows: i32,
    /// Job-level message for terminal `failed` jobs.
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ImportJob {
    /// Parse the stored status string.
    ///
    /// An unknown value means the table and the code disagree, which is
    /// an internal error rather than caller input.
    pub fn status(&self) -> Result<ImportJobStatus, CoreError> {
        ImportJobStatus::parse(&self.status)
            .ok_or_else(|| CoreError::Internal(format!("unknown job status '{}'", self.status)))
    }

    /// Progress snapshot derived from the counter columns.
    pub fn progress(&self) -> ImportProgress {
        ImportProgress::new(
            self.processed_rows.max(0) as u32,
            self.total_rows.max(0) as u32,
            self.created_rows.max(0) as u32,
            self.updated_rows.max(0) as u32,
            self.failed_rows.max(0) as u32,
        )
    }
}

/// Status + counters DTO returned by the job status endpoint, which is
/// also what the client's poll fallback consumes.
#[derive(Debug, Clone, Serialize)]
pub struct ImportJobSummary {
    pub job_id: JobId,
    pub status: ImportJobStatus,
    pub filename: String,
    #[serde(flatten)]
    pub progress: ImportProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportJobSummary {
    /// Build the summary from a job row.
    pub fn from_job(job: &ImportJob) -> Result<Self, CoreError> {
        Ok(Self {
            job_id: job.id,
            status: job.status()?,
            filename: job.filename.clone(),
            progress: job.progress(),
            error: job.error.clone(),
        })
    }
}
