use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use common::state::AppState;
use serde::Deserialize;
use services::window::WindowService;

use crate::response::{ApiResponse, error_reply};
use crate::routes::lectures::WindowResponse;
use crate::ws::lectures::{emit, payload};

#[derive(Debug, Deserialize)]
pub struct CloseWindowReq {
    pub teacher_id: i64,
}

/// PUT /api/attendance-windows/{request_id}/close
pub async fn close_window(
    State(state): State<AppState>,
    Path(request_id): Path<i64>,
    Json(body): Json<CloseWindowReq>,
) -> (StatusCode, Json<ApiResponse<Option<WindowResponse>>>) {
    match WindowService::close(state.db(), request_id, body.teacher_id, Utc::now()).await {
        Ok(window) => {
            emit::window_closed(
                state.ws(),
                payload::WindowClosed {
                    lecture_id: window.lecture_id,
                    request_id: window.id,
                    reason: "closed".into(),
                },
            )
            .await;
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    Some(WindowResponse::from(window)),
                    "Attendance window closed",
                )),
            )
        }
        Err(e) => error_reply(e),
    }
}
