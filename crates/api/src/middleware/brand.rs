//! Tenant (brand) context extractor for Axum handlers.
//!
//! Session resolution and role checks belong to the platform's auth
//! stack, which terminates upstream of this service and injects the
//! resolved brand id as the `x-brand-id` header. This extractor only
//! reads that handle; ownership checks against it happen per-handler.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use dpp_core::error::CoreError;
use dpp_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Name of the header the upstream session layer injects.
pub const BRAND_ID_HEADER: &str = "x-brand-id";

/// The caller's tenant, resolved by the upstream session layer.
///
/// Use as an extractor parameter in any handler that touches
/// per-tenant data:
///
/// ```ignore
/// async fn my_handler(brand: BrandContext) -> AppResult<Json<()>> {
///     tracing::info!(brand_id = brand.brand_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BrandContext {
    pub brand_id: DbId,
}

impl FromRequestParts<AppState> for BrandContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(BRAND_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing brand context header".into(),
                ))
            })?;

        let brand_id: DbId = header.parse().map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid brand context header".into()))
        })?;

        Ok(BrandContext { brand_id })
    }
}
