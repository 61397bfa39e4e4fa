use db::models::lecture::LectureStatus;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Domain error for the attendance services.
///
/// State-machine and window violations are rejected synchronously with the
/// specific kind and cause no partial mutation. `AlreadyMarked` is the benign
/// mapping of a unique-constraint collision and callers treat it as an
/// idempotent outcome rather than a failure.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("invalid lecture state transition: {from} -> {to}")]
    InvalidStateTransition {
        from: LectureStatus,
        to: LectureStatus,
    },

    #[error("attendance window has expired")]
    WindowExpired,

    #[error("attendance window is closed")]
    WindowClosed,

    #[error("attendance already marked")]
    AlreadyMarked,

    #[error("recognition service unavailable: {0}")]
    RecognitionUnavailable(String),

    #[error("biometric verification failed (confidence {confidence:.2})")]
    NoMatch { confidence: f64 },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl AttendanceError {
    /// Maps a unique-constraint violation to `AlreadyMarked`, passing every
    /// other database error through unchanged. Used at the store seams where
    /// the uniqueness constraint is the dedup ground truth.
    pub fn from_insert_err(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AttendanceError::AlreadyMarked,
            _ => AttendanceError::Db(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, AttendanceError>;
