use thiserror::Error;

/// Domain-level error taxonomy for the reservation engine. The HTTP boundary
/// (`locker-server`) maps each variant onto a status code; no richer detail is
/// surfaced for [`ReservationError::CredentialInvalid`] to avoid user enumeration.
#[derive(Error, Debug)]
pub enum ReservationError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("credential invalid")]
    CredentialInvalid,

    #[error("application window closed: {0}")]
    WindowClosed(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("lock store unavailable")]
    Unavailable,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for ReservationError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = ?err, "record store operation failed");
        ReservationError::Internal("record store operation failed".to_string())
    }
}

impl From<redis::RedisError> for ReservationError {
    fn from(err: redis::RedisError) -> Self {
        tracing::error!(error = ?err, "lock store operation failed");
        ReservationError::Unavailable
    }
}

pub type Result<T> = std::result::Result<T, ReservationError>;
