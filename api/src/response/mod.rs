use axum::http::StatusCode;
use serde::Serialize;
use services::error::AttendanceError;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// Every endpoint answers with the same envelope:
/// ```json
/// {
///   "success": true,
///   "data": { ... },
///   "message": "Some message"
/// }
/// ```
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Constructs a success response with the given data and message.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Constructs an error response with a message and default `data`.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

/// Status code for a domain error.
///
/// `AlreadyMarked` maps to 409 here for the callers that treat a duplicate
/// as a conflict; the marking endpoints intercept it before this mapping and
/// answer 200, since a re-mark is an idempotent success there.
pub fn status_for(err: &AttendanceError) -> StatusCode {
    match err {
        AttendanceError::InvalidStateTransition { .. }
        | AttendanceError::WindowExpired
        | AttendanceError::WindowClosed
        | AttendanceError::NoMatch { .. }
        | AttendanceError::Validation(_) => StatusCode::BAD_REQUEST,
        AttendanceError::AlreadyMarked => StatusCode::CONFLICT,
        AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
        AttendanceError::Forbidden(_) => StatusCode::FORBIDDEN,
        AttendanceError::RecognitionUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AttendanceError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// The standard error reply: status from `status_for`, message from the
/// error's `Display`. Database detail is not leaked to clients.
pub fn error_reply<T>(err: AttendanceError) -> (StatusCode, axum::Json<ApiResponse<T>>)
where
    T: Serialize + Default,
{
    let status = status_for(&err);
    let message = match &err {
        AttendanceError::Db(e) => {
            log::error!("database error: {e}");
            "Internal server error".to_string()
        }
        other => other.to_string(),
    };
    (status, axum::Json(ApiResponse::error(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::models::lecture::LectureStatus;

    #[test]
    fn domain_errors_map_to_client_errors() {
        assert_eq!(
            status_for(&AttendanceError::InvalidStateTransition {
                from: LectureStatus::Completed,
                to: LectureStatus::Ongoing,
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&AttendanceError::WindowExpired), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AttendanceError::NotFound("lecture")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&AttendanceError::Forbidden("wrong teacher")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_for(&AttendanceError::AlreadyMarked), StatusCode::CONFLICT);
    }

    #[test]
    fn db_errors_do_not_leak_detail() {
        let err = AttendanceError::Db(sea_orm::DbErr::Custom("secret table names".into()));
        let (status, body) = error_reply::<()>(err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0.message, "Internal server error");
    }
}
