use axum::{
    Router,
    routing::{get, post, put},
};
use ::common::state::AppState;

mod common;
mod get;
mod post;
mod put;

pub use common::{LectureResponse, WindowResponse};
pub use get::lecture_status;
pub use post::{open_attendance_window, schedule_lecture};
pub use put::{cancel_lecture, end_lecture, start_lecture};

pub fn lecture_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(schedule_lecture))
        .route("/{lecture_id}/start", put(start_lecture))
        .route("/{lecture_id}/end", put(end_lecture))
        .route("/{lecture_id}/cancel", put(cancel_lecture))
        .route("/{lecture_id}/status", get(lecture_status))
        .route("/{lecture_id}/attendance-window", post(open_attendance_window))
}
