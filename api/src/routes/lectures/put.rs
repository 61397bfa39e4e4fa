use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use common::state::AppState;
use db::models::lecture;
use common::ws::WebSocketManager;
use services::error::Result;
use services::lecture::LectureService;

use super::common::LectureResponse;
use crate::response::{ApiResponse, error_reply};
use crate::ws::lectures::{emit, payload};

async fn transition_reply(
    ws: &WebSocketManager,
    outcome: Result<lecture::Model>,
    message: &str,
) -> (StatusCode, Json<ApiResponse<Option<LectureResponse>>>) {
    match outcome {
        Ok(lecture) => {
            emit::lecture_status_changed(
                ws,
                payload::LectureStatusChanged {
                    lecture_id: lecture.id,
                    status: lecture.status.to_string(),
                },
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(Some(LectureResponse::from(lecture)), message)),
            )
        }
        Err(e) => error_reply(e),
    }
}

/// PUT /api/lectures/{lecture_id}/start
pub async fn start_lecture(
    State(state): State<AppState>,
    Path(lecture_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Option<LectureResponse>>>) {
    let outcome = LectureService::start(state.db(), lecture_id, Utc::now()).await;
    transition_reply(state.ws(), outcome, "Lecture started").await
}

/// PUT /api/lectures/{lecture_id}/end
///
/// Completes the lecture and runs the duration pass over every student the
/// door sensors observed.
pub async fn end_lecture(
    State(state): State<AppState>,
    Path(lecture_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Option<LectureResponse>>>) {
    let outcome = LectureService::end(state.db(), lecture_id, Utc::now()).await;
    transition_reply(state.ws(), outcome, "Lecture ended").await
}

/// PUT /api/lectures/{lecture_id}/cancel
pub async fn cancel_lecture(
    State(state): State<AppState>,
    Path(lecture_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Option<LectureResponse>>>) {
    let outcome = LectureService::cancel(state.db(), lecture_id, Utc::now()).await;
    transition_reply(state.ws(), outcome, "Lecture cancelled").await
}
