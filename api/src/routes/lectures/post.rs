use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use common::state::AppState;
use serde::Deserialize;
use services::lecture::{LectureService, ScheduleLecture};
use services::window::{OpenWindow, WindowService};

use super::common::{LectureResponse, WindowResponse};
use crate::response::{ApiResponse, error_reply};
use crate::ws::lectures::{emit, payload};

#[derive(Debug, Deserialize)]
pub struct ScheduleLectureReq {
    pub section_id: i64,
    pub teacher_id: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub room_number: Option<String>,
}

/// POST /api/lectures
pub async fn schedule_lecture(
    State(state): State<AppState>,
    Json(body): Json<ScheduleLectureReq>,
) -> (StatusCode, Json<ApiResponse<Option<LectureResponse>>>) {
    let params = ScheduleLecture {
        section_id: body.section_id,
        teacher_id: body.teacher_id,
        scheduled_start: body.scheduled_start,
        scheduled_end: body.scheduled_end,
        room_number: body.room_number,
    };
    match LectureService::schedule(state.db(), params).await {
        Ok(lecture) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                Some(LectureResponse::from(lecture)),
                "Lecture scheduled",
            )),
        ),
        Err(e) => error_reply(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenWindowReq {
    pub teacher_id: i64,
    pub duration_minutes: i32,
}

/// POST /api/lectures/{lecture_id}/attendance-window
///
/// Opens a marking window. A still-active window for the same lecture is
/// superseded in the same call.
pub async fn open_attendance_window(
    State(state): State<AppState>,
    Path(lecture_id): Path<i64>,
    Json(body): Json<OpenWindowReq>,
) -> (StatusCode, Json<ApiResponse<Option<WindowResponse>>>) {
    let params = OpenWindow {
        lecture_id,
        teacher_id: body.teacher_id,
        duration_minutes: body.duration_minutes,
    };
    match WindowService::open(state.db(), params, Utc::now()).await {
        Ok(window) => {
            emit::window_opened(
                state.ws(),
                payload::WindowOpened {
                    lecture_id,
                    request_id: window.id,
                    expires_at: window.expires_at.to_rfc3339(),
                },
            )
            .await;
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    Some(WindowResponse::from(window)),
                    "Attendance window opened",
                )),
            )
        }
        Err(e) => error_reply(e),
    }
}
