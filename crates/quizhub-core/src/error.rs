//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A session, quiz, question, or team was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller lacks the role required for the operation.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// The transition is not legal from the current session state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Malformed input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
