use std::str::FromStr;

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use common::state::AppState;
use db::models::attendance_record::VerificationMethod;
use recognition::{HttpRecognizer, pipeline};
use services::attendance::{AttendanceService, MarkViaWindow};
use services::error::AttendanceError;

use crate::response::{ApiResponse, error_reply};
use crate::ws::lectures::{emit, payload};

#[derive(Debug, Default)]
struct MarkForm {
    student_id: Option<i64>,
    method: Option<String>,
    confidence: Option<f64>,
    reference: Option<Vec<u8>>,
    probe: Option<Vec<u8>>,
}

impl MarkForm {
    async fn parse(mut multipart: Multipart) -> Result<Self, AttendanceError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AttendanceError::Validation(format!("malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "student_id" => {
                    let text = read_text(field).await?;
                    form.student_id = Some(text.trim().parse().map_err(|_| {
                        AttendanceError::Validation("student_id must be an integer".into())
                    })?);
                }
                "method" => form.method = Some(read_text(field).await?),
                "confidence" => {
                    let text = read_text(field).await?;
                    form.confidence = Some(text.trim().parse().map_err(|_| {
                        AttendanceError::Validation("confidence must be a number".into())
                    })?);
                }
                "reference" => form.reference = Some(read_bytes(field).await?),
                "probe" => form.probe = Some(read_bytes(field).await?),
                other => {
                    log::debug!("ignoring unknown mark field '{other}'");
                }
            }
        }
        Ok(form)
    }

    fn biometric_pair(&self) -> Result<(&[u8], &[u8]), AttendanceError> {
        match (&self.reference, &self.probe) {
            (Some(r), Some(p)) => Ok((r, p)),
            _ => Err(AttendanceError::Validation(
                "biometric marking requires 'reference' and 'probe' file parts".into(),
            )),
        }
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AttendanceError> {
    field
        .text()
        .await
        .map_err(|e| AttendanceError::Validation(format!("unreadable field: {e}")))
}

async fn read_bytes(field: axum::extract::multipart::Field<'_>) -> Result<Vec<u8>, AttendanceError> {
    Ok(field
        .bytes()
        .await
        .map_err(|e| AttendanceError::Validation(format!("unreadable file part: {e}")))?
        .to_vec())
}

/// POST /api/attendance-windows/{request_id}/mark
///
/// Multipart: `student_id`, `method` (FACE | VOICE | MANUAL | GPS),
/// optional `confidence`, and for the biometric methods the `reference`
/// and `probe` file parts.
///
/// A repeat mark answers 200: the student is marked either way.
pub async fn mark_attendance(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    multipart: Multipart,
) -> (StatusCode, Json<ApiResponse<()>>) {
    let form = match MarkForm::parse(multipart).await {
        Ok(form) => form,
        Err(e) => return error_reply(e),
    };
    let Some(student_id) = form.student_id else {
        return error_reply(AttendanceError::Validation("student_id is required".into()));
    };
    let method = match form
        .method
        .as_deref()
        .map(VerificationMethod::from_str)
        .transpose()
    {
        Ok(Some(method)) => method,
        Ok(None) => {
            return error_reply(AttendanceError::Validation("method is required".into()));
        }
        Err(_) => {
            return error_reply(AttendanceError::Validation(
                "method must be one of FACE, VOICE, MANUAL, GPS".into(),
            ));
        }
    };

    // Verify before touching the window: a failed biometric must not
    // consume the mark.
    let confidence = match method {
        VerificationMethod::Face => {
            let (reference, probe) = match form.biometric_pair() {
                Ok(pair) => pair,
                Err(e) => return error_reply(e),
            };
            let recognizer = HttpRecognizer::from_config();
            match pipeline::verify_face(&recognizer, reference, probe).await {
                Ok(verification) => verification.confidence,
                Err(e) => return error_reply(e),
            }
        }
        VerificationMethod::Voice => {
            let (reference, probe) = match form.biometric_pair() {
                Ok(pair) => pair,
                Err(e) => return error_reply(e),
            };
            let recognizer = HttpRecognizer::from_config();
            match pipeline::verify_voice(&recognizer, reference, probe).await {
                Ok(confidence) => confidence,
                Err(e) => return error_reply(e),
            }
        }
        VerificationMethod::Manual | VerificationMethod::Gps => form.confidence.unwrap_or(1.0),
    };

    let params = MarkViaWindow {
        request_id,
        student_id,
        verification_method: method,
        confidence,
    };
    match AttendanceService::mark_via_window(state.db(), params, Utc::now()).await {
        Ok(record) => {
            emit::attendance_marked(
                state.ws(),
                payload::AttendanceMarked {
                    lecture_id: record.lecture_id,
                    student_id,
                    method: method.to_string(),
                    confidence,
                },
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success((), "Attendance marked")),
            )
        }
        Err(AttendanceError::AlreadyMarked) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Attendance already marked")),
        ),
        Err(e) => error_reply(e),
    }
}
