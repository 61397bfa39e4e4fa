use axum::{
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
};
use common::state::AppState;

use super::topics::lecture_topic;
use crate::ws::core::forward_topic;

/// GET /ws/lectures/{lecture_id}
///
/// One-way stream: envelope-wrapped events for the lecture topic.
pub async fn lecture_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Path(lecture_id): Path<i64>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| forward_topic(socket, app_state, lecture_topic(lecture_id)))
}
