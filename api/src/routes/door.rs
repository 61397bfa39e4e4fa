use std::str::FromStr;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use chrono::{DateTime, Utc};
use common::state::AppState;
use db::models::entry_exit_log::EventType;
use serde::Deserialize;
use services::error::AttendanceError;
use services::presence::{PresenceService, RecordEvent};

use crate::response::{ApiResponse, error_reply};
use crate::ws::lectures::{emit, payload};

pub fn door_routes() -> Router<AppState> {
    Router::new().route("/events", post(record_door_event))
}

#[derive(Debug, Deserialize)]
pub struct DoorEventReq {
    pub user_id: i64,
    pub lecture_id: i64,
    /// "ENTRY" or "EXIT".
    pub event_type: String,
    /// Defaults to the server's clock when the sensor sends none.
    pub recorded_at: Option<DateTime<Utc>>,
    pub confidence: Option<f64>,
    pub room_number: Option<String>,
}

/// POST /api/door/events
///
/// Appends one sensor observation. Only an ongoing lecture accepts events;
/// the log itself is append-only and is never edited afterwards.
pub async fn record_door_event(
    State(state): State<AppState>,
    Json(body): Json<DoorEventReq>,
) -> (StatusCode, Json<ApiResponse<()>>) {
    let Ok(event_type) = EventType::from_str(&body.event_type) else {
        return error_reply(AttendanceError::Validation(
            "event_type must be ENTRY or EXIT".into(),
        ));
    };

    let params = RecordEvent {
        user_id: body.user_id,
        lecture_id: body.lecture_id,
        event_type,
        recorded_at: body.recorded_at.unwrap_or_else(Utc::now),
        confidence: body.confidence,
        room_number: body.room_number,
    };
    match PresenceService::record_event(state.db(), params).await {
        Ok(event) => {
            emit::presence_event(
                state.ws(),
                payload::PresenceEvent {
                    lecture_id: event.lecture_id,
                    user_id: event.user_id,
                    event_type: event.event_type.to_string(),
                    recorded_at: event.recorded_at.to_rfc3339(),
                },
            )
            .await;
            (
                StatusCode::CREATED,
                Json(ApiResponse::success((), "Door event recorded")),
            )
        }
        Err(e) => error_reply(e),
    }
}
