//! Repository for the staging store (read-only to this core).

use dpp_core::staging::ActionCounts;
use dpp_core::types::JobId;
use sqlx::PgPool;

use crate::models::staging::{ImportRowError, StagingProduct};

/// Column list for `staging_products`.
const STAGING_COLUMNS: &str = "id, job_id, row_number, action, existing_product_id, \
     product_name, upid, sku, variant_name, image_url, created_at";

/// Column list for `import_row_errors`.
const ERROR_COLUMNS: &str = "id, job_id, row_number, raw_data, error, created_at";

/// Read access to staged rows and row-level errors.
///
/// Callers must have verified job ownership before reaching these
/// queries; the repository itself is tenant-blind.
pub struct StagingRepo;

impl StagingRepo {
    /// One page of staged rows, ordered by source row number, plus the
    /// job-wide total.
    pub async fn preview_page(
        pool: &PgPool,
        job_id: JobId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<StagingProduct>, i64), sqlx::Error> {
        let sql = format!(
            "SELECT {STAGING_COLUMNS} FROM staging_products \
             WHERE job_id = $1 ORDER BY row_number LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, StagingProduct>(&sql)
            .bind(job_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM staging_products WHERE job_id = $1")
                .bind(job_id)
                .fetch_one(pool)
                .await?;

        Ok((rows, total.0))
    }

    /// Job-wide counts by action. Independent of any preview page.
    pub async fn count_by_action(pool: &PgPool, job_id: JobId) -> Result<ActionCounts, sqlx::Error> {
        let counts: (i64, i64) = sqlx::query_as(
            "SELECT \
                COUNT(*) FILTER (WHERE action = 'create'), \
                COUNT(*) FILTER (WHERE action = 'update') \
             FROM staging_products WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_one(pool)
        .await?;

        Ok(ActionCounts {
            create: counts.0,
            update: counts.1,
        })
    }

    /// One page of row-level errors, ordered by source row number, plus
    /// the job-wide error total.
    pub async fn errors_page(
        pool: &PgPool,
        job_id: JobId,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ImportRowError>, i64), sqlx::Error> {
        let sql = format!(
            "SELECT {ERROR_COLUMNS} FROM import_row_errors \
             WHERE job_id = $1 ORDER BY row_number LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, ImportRowError>(&sql)
            .bind(job_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM import_row_errors WHERE job_id = $1")
                .bind(job_id)
                .fetch_one(pool)
                .await?;

        Ok((rows, total.0))
    }

    /// All failed rows for the correction export, ordered by source row
    /// number. Unpaginated; bounded by the job's size.
    pub async fn failed_rows_for_export(
        pool: &PgPool,
        job_id: JobId,
    ) -> Result<Vec<ImportRowError>, sqlx::Error> {
        let sql = format!(
            "SELECT {ERROR_COLUMNS} FROM import_row_errors \
             WHERE job_id = $1 ORDER BY row_number"
        );
        sqlx::query_as::<_, ImportRowError>(&sql)
            .bind(job_id)
            .fetch_all(pool)
            .await
    }
}
