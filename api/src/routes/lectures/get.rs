use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use common::state::AppState;
use services::attendance::{AttendanceService, LectureLiveStatus};

use crate::response::{ApiResponse, error_reply};

/// GET /api/lectures/{lecture_id}/status
///
/// Live counts and per-student state, rebuilt from the record store. This is
/// the recovery path for clients that missed WebSocket pushes.
pub async fn lecture_status(
    State(state): State<AppState>,
    Path(lecture_id): Path<i64>,
) -> (StatusCode, Json<ApiResponse<Option<LectureLiveStatus>>>) {
    match AttendanceService::live_status(state.db(), lecture_id, Utc::now()).await {
        Ok(status) => (
            StatusCode::OK,
            Json(ApiResponse::success(Some(status), "Lecture status fetched")),
        ),
        Err(e) => error_reply(e),
    }
}
