use axum::{
    Router,
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use common::state::AppState;

use super::lectures::topics::teacher_topic;
use crate::ws::core::forward_topic;

pub fn ws_teacher_routes() -> Router<AppState> {
    Router::new().route("/{teacher_id}", get(teacher_ws_handler))
}

/// GET /ws/teachers/{teacher_id}
///
/// One-way stream: events addressed to one teacher, across lectures.
pub async fn teacher_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Path(teacher_id): Path<i64>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| forward_topic(socket, app_state, teacher_topic(teacher_id)))
}
