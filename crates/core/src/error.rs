//! Domain error taxonomy and the engine's HTTP outcome vocabulary.
//!
//! Every submission/vote/moderation failure is a pure function of current
//! state plus input; the variants below carry the human-readable reason
//! where one exists. `http_status` is the contract consumed by whatever
//! routing layer sits in front of the engine.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed shape or range. Always local, never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Automod, lock, or warning rejection. Carries the reason when known.
    #[error("Rejected: {0}")]
    Policy(String),

    /// Duplicate submission or conflicting state change.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// No matching segment or record.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The engine refuses fresh reads under load.
    #[error("Service overloaded")]
    Overloaded,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status code for this outcome.
    pub fn http_status(&self) -> u16 {
        match self {
            CoreError::Validation(_) => 400,
            CoreError::Policy(_) => 403,
            CoreError::NotFound(_) => 404,
            CoreError::Conflict(_) => 409,
            CoreError::Overloaded => 503,
            CoreError::Internal(_) => 500,
        }
    }
}
