//! Repository for the import job status store.

use dpp_core::job::ImportJobStatus;
use dpp_core::types::JobId;
use sqlx::PgPool;

use crate::models::import_job::ImportJob;

/// Column list for `import_jobs`.
const JOB_COLUMNS: &str = "id, brand_id, status, filename, processed_rows, total_rows, \
     created_rows, updated_rows, failed_rows, error, created_at, updated_at";

/// Read access plus the two client-initiated compare-and-set
/// transitions (commit approval, advisory cancel). Everything else in
/// `import_jobs` is written by the background worker.
pub struct ImportJobRepo;

impl ImportJobRepo {
    /// Find an import job by ID.
    pub async fn find_by_id(pool: &PgPool, job_id: JobId) -> Result<Option<ImportJob>, sqlx::Error> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM import_jobs WHERE id = $1");
        sqlx::query_as::<_, ImportJob>(&sql)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// Approve the commit: `validated -> committing`.
    ///
    /// The status predicate in the WHERE clause is the pause-state
    /// contract: a job that is not currently `validated` (still
    /// validating, already committing, or terminal) is left untouched
    /// and `None` is returned, which the handler maps to a 409.
    pub async fn approve_commit(
        pool: &PgPool,
        job_id: JobId,
    ) -> Result<Option<ImportJob>, sqlx::Error> {
        let sql = format!(
            "UPDATE import_jobs SET \
                status = $2, \
                updated_at = now() \
             WHERE id = $1 AND status = $3 \
             RETURNING {JOB_COLUMNS}"
        );
        sqlx::query_as::<_, ImportJob>(&sql)
            .bind(job_id)
            .bind(ImportJobStatus::Committing.as_str())
            .bind(ImportJobStatus::Validated.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Advisory cancel: set `cancelled` on any non-terminal job.
    ///
    /// Returns `None` when the job is already terminal. Rows the worker
    /// has in flight are its responsibility; this only records intent.
    pub async fn cancel(pool: &PgPool, job_id: JobId) -> Result<Option<ImportJob>, sqlx::Error> {
        let sql = format!(
            "UPDATE import_jobs SET \
                status = $2, \
                updated_at = now() \
             WHERE id = $1 AND status NOT IN ('completed', 'failed', 'cancelled') \
             RETURNING {JOB_COLUMNS}"
        );
        sqlx::query_as::<_, ImportJob>(&sql)
            .bind(job_id)
            .bind(ImportJobStatus::Cancelled.as_str())
            .fetch_optional(pool)
            .await
    }
}
