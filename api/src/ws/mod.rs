//! WebSocket entry point for `/ws/...`.
//!
//! Realtime pushes are best-effort: a dropped connection or missed message
//! loses nothing, because every pushed state is reconstructable from the
//! REST status endpoints.

use axum::Router;
use common::state::AppState;

pub mod core;
pub mod lectures;
pub mod teachers;

use lectures::ws_lecture_routes;
use teachers::ws_teacher_routes;

pub fn ws_routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/lectures", ws_lecture_routes())
        .nest("/teachers", ws_teacher_routes())
        .with_state(app_state)
}
