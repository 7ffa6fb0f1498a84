//! Domain-level error type shared across the workspace.

/// Errors produced by domain logic, independent of any transport.
///
/// The API layer maps these onto HTTP statuses; see `dpp-api`'s
/// `AppError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// An entity could not be found by its identifier.
    #[error("{entity} {id} not found")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// Input failed a domain validation rule.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation conflicts with the entity's current state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller is not authenticated.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is authenticated but does not own the resource.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// An unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}
