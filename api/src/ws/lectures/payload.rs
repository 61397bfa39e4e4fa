use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LectureStatusChanged {
    pub lecture_id: i64,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowOpened {
    pub lecture_id: i64,
    pub request_id: i64,
    pub expires_at: String, // RFC3339
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowClosed {
    pub lecture_id: i64,
    pub request_id: i64,
    /// "closed" or "expired".
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceMarked {
    pub lecture_id: i64,
    pub student_id: i64,
    pub method: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PresenceEvent {
    pub lecture_id: i64,
    pub user_id: i64,
    pub event_type: String,
    pub recorded_at: String, // RFC3339
}

#[derive(Debug, Clone, Serialize)]
pub struct TeacherMarked {
    pub teacher_id: i64,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lecture_id: Option<i64>,
    pub method: String,
}
