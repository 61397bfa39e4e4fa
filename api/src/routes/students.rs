use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use chrono::NaiveDate;
use common::state::AppState;
use serde::Deserialize;
use services::attendance::{AttendanceService, HistoryEntry};

use crate::response::{ApiResponse, error_reply};

pub fn student_routes() -> Router<AppState> {
    Router::new().route("/{student_id}/attendance", get(student_attendance))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// GET /api/students/{student_id}/attendance?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn student_attendance(
    State(state): State<AppState>,
    Path(student_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<HistoryEntry>>>) {
    match AttendanceService::student_history(state.db(), student_id, query.from, query.to).await {
        Ok(entries) => (
            StatusCode::OK,
            Json(ApiResponse::success(entries, "Attendance history fetched")),
        ),
        Err(e) => error_reply(e),
    }
}
