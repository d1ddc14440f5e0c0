//! Engine-level error type wrapping domain and database failures.

use openskip_core::error::CoreError;

/// Error type for all engine services.
///
/// Wraps [`CoreError`] for domain outcomes and classifies database errors
/// into the same HTTP outcome vocabulary: unique-constraint violations
/// surface as conflicts, missing rows as not-found.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A domain-level outcome from `openskip-core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for service return values.
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// HTTP status code for this outcome.
    pub fn http_status(&self) -> u16 {
        match self {
            EngineError::Core(core) => core.http_status(),
            EngineError::Database(err) => classify_sqlx_error(err),
        }
    }
}

/// Classify a sqlx error into an HTTP status.
///
/// - `RowNotFound` maps to 404.
/// - Unique constraint violations (PostgreSQL 23505) map to 409; the
///   duplicate-submission index makes a racing twin surface here.
/// - Everything else maps to 500.
fn classify_sqlx_error(err: &sqlx::Error) -> u16 {
    match err {
        sqlx::Error::RowNotFound => 404,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => 409,
        _ => 500,
    }
}
