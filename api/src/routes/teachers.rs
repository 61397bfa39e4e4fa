use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::post,
};
use chrono::{NaiveDate, Utc};
use common::state::AppState;
use db::models::teacher_attendance::TeacherVerificationMethod;
use recognition::{HttpRecognizer, pipeline};
use serde::Serialize;
use services::error::AttendanceError;
use services::teacher_attendance::{MarkTeacherAttendance, TeacherAttendanceService};

use crate::response::{ApiResponse, error_reply};
use crate::ws::lectures::{emit, payload};

pub fn teacher_routes() -> Router<AppState> {
    Router::new().route("/{teacher_id}/attendance", post(mark_teacher_attendance))
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct TeacherMarkResponse {
    pub teacher_id: i64,
    pub date: NaiveDate,
    pub lecture_id: Option<i64>,
    pub verification_method: String,
    pub confidence: f64,
}

#[derive(Debug, Default)]
struct TeacherMarkForm {
    date: Option<NaiveDate>,
    lecture_id: Option<i64>,
    method: Option<String>,
    confidence: Option<f64>,
    reference: Option<Vec<u8>>,
    probe: Option<Vec<u8>>,
}

impl TeacherMarkForm {
    async fn parse(mut multipart: Multipart) -> Result<Self, AttendanceError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AttendanceError::Validation(format!("malformed multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "date" => {
                    let text = text_of(field).await?;
                    form.date = Some(text.trim().parse().map_err(|_| {
                        AttendanceError::Validation("date must be YYYY-MM-DD".into())
                    })?);
                }
                "lecture_id" => {
                    let text = text_of(field).await?;
                    form.lecture_id = Some(text.trim().parse().map_err(|_| {
                        AttendanceError::Validation("lecture_id must be an integer".into())
                    })?);
                }
                "method" => form.method = Some(text_of(field).await?),
                "confidence" => {
                    let text = text_of(field).await?;
                    form.confidence = Some(text.trim().parse().map_err(|_| {
                        AttendanceError::Validation("confidence must be a number".into())
                    })?);
                }
                "reference" => form.reference = Some(bytes_of(field).await?),
                "probe" => form.probe = Some(bytes_of(field).await?),
                other => {
                    log::debug!("ignoring unknown teacher mark field '{other}'");
                }
            }
        }
        Ok(form)
    }
}

async fn text_of(field: axum::extract::multipart::Field<'_>) -> Result<String, AttendanceError> {
    field
        .text()
        .await
        .map_err(|e| AttendanceError::Validation(format!("unreadable field: {e}")))
}

async fn bytes_of(field: axum::extract::multipart::Field<'_>) -> Result<Vec<u8>, AttendanceError> {
    Ok(field
        .bytes()
        .await
        .map_err(|e| AttendanceError::Validation(format!("unreadable file part: {e}")))?
        .to_vec())
}

/// POST /api/teachers/{teacher_id}/attendance
///
/// Multipart: optional `date` (defaults to today), optional `lecture_id`
/// (absent ⇒ the mark covers the whole day), `method` (FACE | MANUAL),
/// optional `confidence`, and for FACE the `reference` and `probe` parts.
/// When the recognition service is down and the local comparison decides,
/// the stored method is FACE_LOCAL.
///
/// At most one mark exists per key; a repeat answers 200.
pub async fn mark_teacher_attendance(
    State(state): State<AppState>,
    Path(teacher_id): Path<i64>,
    multipart: Multipart,
) -> (StatusCode, Json<ApiResponse<Option<TeacherMarkResponse>>>) {
    let now = Utc::now();
    let form = match TeacherMarkForm::parse(multipart).await {
        Ok(form) => form,
        Err(e) => return error_reply(e),
    };
    let requested = match form
        .method
        .as_deref()
        .map(TeacherVerificationMethod::from_str)
        .transpose()
    {
        Ok(Some(method)) => method,
        Ok(None) => {
            return error_reply(AttendanceError::Validation("method is required".into()));
        }
        Err(_) => {
            return error_reply(AttendanceError::Validation(
                "method must be FACE or MANUAL".into(),
            ));
        }
    };

    let (method, confidence) = match requested {
        TeacherVerificationMethod::Face | TeacherVerificationMethod::FaceLocal => {
            let (Some(reference), Some(probe)) = (&form.reference, &form.probe) else {
                return error_reply(AttendanceError::Validation(
                    "face marking requires 'reference' and 'probe' file parts".into(),
                ));
            };
            let recognizer = HttpRecognizer::from_config();
            match pipeline::verify_face(&recognizer, reference, probe).await {
                Ok(verification) if verification.used_fallback => {
                    (TeacherVerificationMethod::FaceLocal, verification.confidence)
                }
                Ok(verification) => (TeacherVerificationMethod::Face, verification.confidence),
                Err(e) => return error_reply(e),
            }
        }
        TeacherVerificationMethod::Manual => {
            (TeacherVerificationMethod::Manual, form.confidence.unwrap_or(1.0))
        }
    };

    let params = MarkTeacherAttendance {
        teacher_id,
        date: form.date.unwrap_or_else(|| now.date_naive()),
        lecture_id: form.lecture_id,
        verification_method: method,
        confidence,
    };
    match TeacherAttendanceService::mark(state.db(), params, now).await {
        Ok(mark) => {
            emit::teacher_marked(
                state.ws(),
                payload::TeacherMarked {
                    teacher_id,
                    date: mark.date.to_string(),
                    lecture_id: mark.lecture_id,
                    method: mark.verification_method.to_string(),
                },
            )
            .await;
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    Some(TeacherMarkResponse {
                        teacher_id: mark.teacher_id,
                        date: mark.date,
                        lecture_id: mark.lecture_id,
                        verification_method: mark.verification_method.to_string(),
                        confidence: mark.confidence,
                    }),
                    "Teacher attendance marked",
                )),
            )
        }
        Err(AttendanceError::AlreadyMarked) => (
            StatusCode::OK,
            Json(ApiResponse::success(None, "Teacher attendance already marked")),
        ),
        Err(e) => error_reply(e),
    }
}
