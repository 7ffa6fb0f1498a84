//! Models for the staging store: per-row verdicts and row-level errors.

use dpp_core::types::{DbId, JobId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `staging_products` table.
///
/// Immutable once written by the validator; read-only to this core. The
/// product/variant columns are a denormalized display projection for the
/// review preview, not the full catalog record.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StagingProduct {
    pub id: DbId,
    pub job_id: JobId,
    /// 1-based position in the source file.
    pub row_number: i32,
    pub action: String,
    /// Set only when `action == update`.
    pub existing_product_id: Option<uuid::Uuid>,
    pub product_name: String,
    pub upid: Option<String>,
    pub sku: Option<String>,
    pub variant_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}

/// A row from the `import_row_errors` table.
///
/// `raw_data` keeps the original payload so the correction export can
/// reproduce the uploaded row verbatim.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportRowError {
    pub id: DbId,
    pub job_id: JobId,
    pub row_number: i32,
    pub raw_data: serde_json::Value,
    pub error: String,
    pub created_at: Timestamp,
}
