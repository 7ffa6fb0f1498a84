//! Repository integration tests against a real Postgres schema.
//!
//! The background worker owns most writes to these tables; tests stand
//! in for it with plain INSERT/UPDATE statements.

use dpp_core::job::ImportJobStatus;
use dpp_core::types::JobId;
use dpp_db::repositories::{ImportJobRepo, StagingRepo};
use sqlx::PgPool;

/// Insert a job row the way the upload endpoint's collaborator would.
async fn seed_job(pool: &PgPool, brand_id: i64, status: &str, total: i32) -> JobId {
    let row: (JobId,) = sqlx::query_as(
        "INSERT INTO import_jobs (brand_id, status, filename, total_rows) \
         VALUES ($1, $2, 'catalog.csv', $3) RETURNING id",
    )
    .bind(brand_id)
    .bind(status)
    .bind(total)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

/// Populate staging rows and row errors the way the validator would.
async fn seed_staging(pool: &PgPool, job_id: JobId, creates: i32, updates: i32, errors: i32) {
    let mut row_number = 0;
    for _ in 0..creates {
        row_number += 1;
        sqlx::query(
            "INSERT INTO staging_products (job_id, row_number, action, product_name, upid) \
             VALUES ($1, $2, 'create', 'Tee', 'UP-' || $2)",
        )
        .bind(job_id)
        .bind(row_number)
        .execute(pool)
        .await
        .unwrap();
    }
    for _ in 0..updates {
        row_number += 1;
        sqlx::query(
            "INSERT INTO staging_products \
                (job_id, row_number, action, existing_product_id, product_name, upid) \
             VALUES ($1, $2, 'update', gen_random_uuid(), 'Hoodie', 'UP-' || $2)",
        )
        .bind(job_id)
        .bind(row_number)
        .execute(pool)
        .await
        .unwrap();
    }
    for _ in 0..errors {
        row_number += 1;
        sqlx::query(
            "INSERT INTO import_row_errors (job_id, row_number, raw_data, error) \
             VALUES ($1, $2, '{\"product_name\": \"Bad\"}', 'missing identifier')",
        )
        .bind(job_id)
        .bind(row_number)
        .execute(pool)
        .await
        .unwrap();
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn find_by_id_returns_the_job(pool: PgPool) {
    let job_id = seed_job(&pool, 1, "validating", 10).await;

    let job = ImportJobRepo::find_by_id(&pool, job_id)
        .await
        .unwrap()
        .expect("job exists");
    assert_eq!(job.brand_id, 1);
    assert_eq!(job.status().unwrap(), ImportJobStatus::Validating);
    assert_eq!(job.filename, "catalog.csv");

    let missing = ImportJobRepo::find_by_id(&pool, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn action_counts_plus_errors_equal_total_when_validated(pool: PgPool) {
    let job_id = seed_job(&pool, 1, "validated", 10).await;
    seed_staging(&pool, job_id, 7, 2, 1).await;

    let counts = StagingRepo::count_by_action(&pool, job_id).await.unwrap();
    assert_eq!(counts.create, 7);
    assert_eq!(counts.update, 2);
    assert_eq!(counts.valid(), 9);

    let (_, total_errors) = StagingRepo::errors_page(&pool, job_id, 10, 0).await.unwrap();
    assert_eq!(total_errors, 1);

    let job = ImportJobRepo::find_by_id(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(counts.valid() + total_errors, job.total_rows as i64);
}

#[sqlx::test(migrations = "./migrations")]
async fn approve_commit_only_from_validated(pool: PgPool) {
    let job_id = seed_job(&pool, 1, "validating", 10).await;

    // Still validating: the gate must refuse.
    let refused = ImportJobRepo::approve_commit(&pool, job_id).await.unwrap();
    assert!(refused.is_none());

    sqlx::query("UPDATE import_jobs SET status = 'validated' WHERE id = $1")
        .bind(job_id)
        .execute(&pool)
        .await
        .unwrap();

    let approved = ImportJobRepo::approve_commit(&pool, job_id)
        .await
        .unwrap()
        .expect("first approval succeeds");
    assert_eq!(approved.status().unwrap(), ImportJobStatus::Committing);

    // Second approval is a no-op: the job is no longer validated.
    let again = ImportJobRepo::approve_commit(&pool, job_id).await.unwrap();
    assert!(again.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn cancel_skips_terminal_jobs(pool: PgPool) {
    let active = seed_job(&pool, 1, "validating", 10).await;
    let done = seed_job(&pool, 1, "completed", 10).await;

    let cancelled = ImportJobRepo::cancel(&pool, active)
        .await
        .unwrap()
        .expect("non-terminal job can be cancelled");
    assert_eq!(cancelled.status().unwrap(), ImportJobStatus::Cancelled);

    let untouched = ImportJobRepo::cancel(&pool, done).await.unwrap();
    assert!(untouched.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn preview_page_is_ordered_and_counts_job_wide(pool: PgPool) {
    let job_id = seed_job(&pool, 1, "validated", 5).await;
    seed_staging(&pool, job_id, 3, 2, 0).await;

    let (page, total) = StagingRepo::preview_page(&pool, job_id, 2, 0).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(total, 5);
    assert_eq!(page[0].row_number, 1);
    assert_eq!(page[1].row_number, 2);

    let (rest, total) = StagingRepo::preview_page(&pool, job_id, 10, 4).await.unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(total, 5);
    assert_eq!(rest[0].action, "update");
}

#[sqlx::test(migrations = "./migrations")]
async fn export_rows_preserve_raw_data(pool: PgPool) {
    let job_id = seed_job(&pool, 1, "validated", 3).await;
    seed_staging(&pool, job_id, 2, 0, 1).await;

    let rows = StagingRepo::failed_rows_for_export(&pool, job_id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].raw_data["product_name"], "Bad");
    assert_eq!(rows[0].error, "missing identifier");

    // A job with zero failures exports an empty list, not an error.
    let clean = seed_job(&pool, 1, "validated", 0).await;
    let none = StagingRepo::failed_rows_for_export(&pool, clean).await.unwrap();
    assert!(none.is_empty());
}
