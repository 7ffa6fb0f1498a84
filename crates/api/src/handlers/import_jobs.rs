//! Handlers for the import job review/commit gate.
//!
//! The background validator populates the staging store and advances job
//! status; these endpoints let the owning brand inspect exactly what a
//! commit will do, approve it explicitly, or cancel. Every read
//! re-verifies brand ownership against the job record before touching
//! staging data — staging rows are per-tenant sensitive and must not be
//! reachable by id guessing.

use axum::extract::{Path, Query, State};
use axum::Json;
use dpp_core::error::CoreError;
use dpp_core::export::{generate_csv, ExportResult, FailedRow};
use dpp_core::job::{ImportJobStatus, ProgressUpdate};
use dpp_core::staging::ActionCounts;
use dpp_core::types::JobId;
use dpp_db::models::import_job::{ImportJob, ImportJobSummary};
use dpp_db::models::staging::{ImportRowError, StagingProduct};
use dpp_db::repositories::{clamp_limit, clamp_offset, ImportJobRepo, StagingRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::BrandContext;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a job by ID and verify the caller's brand owns it.
///
/// Returns `NotFound` if the job does not exist and `Forbidden` if it
/// belongs to a different brand. `action` is used in the error message
/// (e.g. "view", "commit", "cancel"); the message never carries row
/// contents.
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    job_id: JobId,
    brand: &BrandContext,
    action: &str,
) -> AppResult<ImportJob> {
    let job = ImportJobRepo::find_by_id(pool, job_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "ImportJob",
                id: job_id.to_string(),
            })
        })?;

    if job.brand_id != brand.brand_id {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} another brand's import job"
        ))));
    }

    Ok(job)
}

/// Publish the job's current state to the push transport.
///
/// Push delivery is best-effort; the job status store remains the
/// durable record and the poll fallback covers disconnected clients.
fn publish_update(state: &AppState, job: &ImportJob, status: ImportJobStatus) {
    state.progress_bus.publish(ProgressUpdate {
        job_id: job.id,
        status,
        progress: job.progress(),
        filename: job.filename.clone(),
    });
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/v1/import-jobs/{id}
///
/// Job status and counters. This is what the client's poll fallback
/// consumes when the push transport is down.
pub async fn get_job_status(
    brand: BrandContext,
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<Json<DataResponse<ImportJobSummary>>> {
    let job = find_and_authorize(&state.pool, job_id, &brand, "view").await?;
    let summary = ImportJobSummary::from_job(&job)?;
    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// Review summary
// ---------------------------------------------------------------------------

/// Action counts enriched with the derived review totals.
#[derive(Debug, Serialize)]
pub struct ReviewCounts {
    pub will_create: i64,
    pub will_update: i64,
    /// Rows that will be written on commit (`create + update`).
    pub valid: i64,
    /// Rows that failed validation.
    pub invalid: i64,
}

impl ReviewCounts {
    fn new(counts: ActionCounts, total_errors: i64) -> Self {
        Self {
            will_create: counts.create,
            will_update: counts.update,
            valid: counts.valid(),
            invalid: total_errors,
        }
    }
}

/// Combined first fetch for the review dialog.
#[derive(Debug, Serialize)]
pub struct ReviewSummary {
    pub job: ImportJobSummary,
    pub products: Vec<StagingProduct>,
    pub total_products: i64,
    pub errors: Vec<ImportRowError>,
    pub total_errors: i64,
    pub counts: ReviewCounts,
}

/// GET /api/v1/import-jobs/{id}/review
///
/// Single combined fetch: job summary, first page of staging rows,
/// first page of errors, and job-wide action counts.
pub async fn review_summary(
    brand: BrandContext,
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<Json<DataResponse<ReviewSummary>>> {
    let job = find_and_authorize(&state.pool, job_id, &brand, "review").await?;

    let limit = clamp_limit(None);
    let (products, total_products) = StagingRepo::preview_page(&state.pool, job_id, limit, 0).await?;
    let (errors, total_errors) = StagingRepo::errors_page(&state.pool, job_id, limit, 0).await?;
    let counts = StagingRepo::count_by_action(&state.pool, job_id).await?;

    Ok(Json(DataResponse {
        data: ReviewSummary {
            job: ImportJobSummary::from_job(&job)?,
            products,
            total_products,
            errors,
            total_errors,
            counts: ReviewCounts::new(counts, total_errors),
        },
    }))
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

/// Paginated staging preview. `will_create` / `will_update` reflect the
/// whole job, not the returned page.
#[derive(Debug, Serialize)]
pub struct StagingPreview {
    pub rows: Vec<StagingProduct>,
    pub total: i64,
    pub will_create: i64,
    pub will_update: i64,
}

/// GET /api/v1/import-jobs/{id}/preview?limit=&offset=
pub async fn preview(
    brand: BrandContext,
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<StagingPreview>>> {
    find_and_authorize(&state.pool, job_id, &brand, "preview").await?;

    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let (rows, total) = StagingRepo::preview_page(&state.pool, job_id, limit, offset).await?;
    let counts = StagingRepo::count_by_action(&state.pool, job_id).await?;

    Ok(Json(DataResponse {
        data: StagingPreview {
            rows,
            total,
            will_create: counts.create,
            will_update: counts.update,
        },
    }))
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Paginated row-level errors.
#[derive(Debug, Serialize)]
pub struct ErrorPage {
    pub errors: Vec<ImportRowError>,
    pub total_errors: i64,
}

/// GET /api/v1/import-jobs/{id}/errors?limit=&offset=
pub async fn errors(
    brand: BrandContext,
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<ErrorPage>>> {
    find_and_authorize(&state.pool, job_id, &brand, "inspect").await?;

    let limit = clamp_limit(params.limit);
    let offset = clamp_offset(params.offset);
    let (errors, total_errors) = StagingRepo::errors_page(&state.pool, job_id, limit, offset).await?;

    Ok(Json(DataResponse {
        data: ErrorPage {
            errors,
            total_errors,
        },
    }))
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// GET /api/v1/import-jobs/{id}/export
///
/// CSV of failed rows: original raw fields plus a trailing
/// `error_message` column. A job with zero failures returns
/// `{ csv: "", total_rows: 0 }`, never an error, so the UI can offer
/// the download action uniformly.
pub async fn export(
    brand: BrandContext,
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<Json<DataResponse<ExportResult>>> {
    find_and_authorize(&state.pool, job_id, &brand, "export").await?;

    let failed = StagingRepo::failed_rows_for_export(&state.pool, job_id).await?;
    let rows: Vec<FailedRow> = failed
        .into_iter()
        .map(|r| FailedRow {
            raw_data: r.raw_data,
            error: r.error,
        })
        .collect();

    let result = generate_csv(&rows)?;
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// Commit approval
// ---------------------------------------------------------------------------

/// POST /api/v1/import-jobs/{id}/commit
///
/// The explicit, user-gated `validated -> committing` transition. The
/// state machine never takes this step on its own: approval here is the
/// only way staged rows reach the commit executor.
pub async fn approve_commit(
    brand: BrandContext,
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<Json<DataResponse<ImportJobSummary>>> {
    find_and_authorize(&state.pool, job_id, &brand, "commit").await?;

    let job = ImportJobRepo::approve_commit(&state.pool, job_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Import job must be in 'validated' status to commit".to_string(),
            ))
        })?;

    tracing::info!(job_id = %job.id, brand_id = brand.brand_id, "Import commit approved");
    publish_update(&state, &job, ImportJobStatus::Committing);

    let summary = ImportJobSummary::from_job(&job)?;
    Ok(Json(DataResponse { data: summary }))
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// POST /api/v1/import-jobs/{id}/cancel
///
/// Advisory cancel. Records intent in the job record and notifies push
/// subscribers; the background worker remains the authority for rows
/// already in flight. Cancelling a terminal job is a conflict.
pub async fn cancel(
    brand: BrandContext,
    State(state): State<AppState>,
    Path(job_id): Path<JobId>,
) -> AppResult<Json<DataResponse<ImportJobSummary>>> {
    find_and_authorize(&state.pool, job_id, &brand, "cancel").await?;

    let job = ImportJobRepo::cancel(&state.pool, job_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "Import job is already in a terminal status".to_string(),
            ))
        })?;

    tracing::info!(job_id = %job.id, brand_id = brand.brand_id, "Import job cancelled");
    publish_update(&state, &job, ImportJobStatus::Cancelled);

    let summary = ImportJobSummary::from_job(&job)?;
    Ok(Json(DataResponse { data: summary }))
}
