use chrono::{DateTime, Utc};
use db::models::{attendance_request, lecture};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LectureResponse {
    pub id: i64,
    pub section_id: i64,
    pub teacher_id: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub room_number: Option<String>,
    pub status: String,
}

impl From<lecture::Model> for LectureResponse {
    fn from(m: lecture::Model) -> Self {
        Self {
            id: m.id,
            section_id: m.section_id,
            teacher_id: m.teacher_id,
            scheduled_start: m.scheduled_start,
            scheduled_end: m.scheduled_end,
            actual_start: m.actual_start,
            actual_end: m.actual_end,
            room_number: m.room_number,
            status: m.status.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowResponse {
    pub id: i64,
    pub lecture_id: i64,
    pub teacher_id: i64,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: String,
}

impl From<attendance_request::Model> for WindowResponse {
    fn from(m: attendance_request::Model) -> Self {
        Self {
            id: m.id,
            lecture_id: m.lecture_id,
            teacher_id: m.teacher_id,
            duration_minutes: m.duration_minutes,
            created_at: m.created_at,
            expires_at: m.expires_at,
            status: m.status.to_string(),
        }
    }
}
