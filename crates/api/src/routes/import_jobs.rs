//! Route definitions for the import job review/commit gate.
//!
//! Mounted at `/import-jobs`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::import_jobs;
use crate::state::AppState;

/// Routes mounted at `/import-jobs`.
///
/// ```text
/// GET    /{id}          -> get_job_status   (poll fallback)
/// GET    /{id}/review   -> review_summary
/// GET    /{id}/preview  -> preview
/// GET    /{id}/errors   -> errors
/// GET    /{id}/export   -> export
/// POST   /{id}/commit   -> approve_commit
/// POST   /{id}/cancel   -> cancel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(import_jobs::get_job_status))
        .route("/{id}/review", get(import_jobs::review_summary))
        .route("/{id}/preview", get(import_jobs::preview))
        .route("/{id}/errors", get(import_jobs::errors))
        .route("/{id}/export", get(import_jobs::export))
        .route("/{id}/commit", post(import_jobs::approve_commit))
        .route("/{id}/cancel", post(import_jobs::cancel))
}
