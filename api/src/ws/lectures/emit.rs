use common::ws::WebSocketManager;
use serde::Serialize;

use super::payload;
use super::topics::{lecture_topic, teacher_topic};
use crate::ws::core::{Event, emit};

#[derive(Debug, Serialize)]
pub struct LectureStatusChangedEvent {
    #[serde(flatten)]
    pub payload: payload::LectureStatusChanged,
}
impl Event for LectureStatusChangedEvent {
    const NAME: &'static str = "lecture.status_changed";
    fn topic_path(&self) -> String {
        lecture_topic(self.payload.lecture_id)
    }
}

#[derive(Debug, Serialize)]
pub struct WindowOpenedEvent {
    #[serde(flatten)]
    pub payload: payload::WindowOpened,
}
impl Event for WindowOpenedEvent {
    const NAME: &'static str = "lecture.window_opened";
    fn topic_path(&self) -> String {
        lecture_topic(self.payload.lecture_id)
    }
}

#[derive(Debug, Serialize)]
pub struct WindowClosedEvent {
    #[serde(flatten)]
    pub payload: payload::WindowClosed,
}
impl Event for WindowClosedEvent {
    const NAME: &'static str = "lecture.window_closed";
    fn topic_path(&self) -> String {
        lecture_topic(self.payload.lecture_id)
    }
}

#[derive(Debug, Serialize)]
pub struct AttendanceMarkedEvent {
    #[serde(flatten)]
    pub payload: payload::AttendanceMarked,
}
impl Event for AttendanceMarkedEvent {
    const NAME: &'static str = "lecture.attendance_marked";
    fn topic_path(&self) -> String {
        lecture_topic(self.payload.lecture_id)
    }
}

#[derive(Debug, Serialize)]
pub struct PresenceEventRecorded {
    #[serde(flatten)]
    pub payload: payload::PresenceEvent,
}
impl Event for PresenceEventRecorded {
    const NAME: &'static str = "lecture.presence_event";
    fn topic_path(&self) -> String {
        lecture_topic(self.payload.lecture_id)
    }
}

#[derive(Debug, Serialize)]
pub struct TeacherMarkedEvent {
    #[serde(flatten)]
    pub payload: payload::TeacherMarked,
}
impl Event for TeacherMarkedEvent {
    const NAME: &'static str = "teacher.attendance_marked";
    fn topic_path(&self) -> String {
        teacher_topic(self.payload.teacher_id)
    }
}

/* ---------- one-liner helpers ---------- */

pub async fn lecture_status_changed(ws: &WebSocketManager, p: payload::LectureStatusChanged) {
    emit(ws, &LectureStatusChangedEvent { payload: p }).await;
}

pub async fn window_opened(ws: &WebSocketManager, p: payload::WindowOpened) {
    emit(ws, &WindowOpenedEvent { payload: p }).await;
}

pub async fn window_closed(ws: &WebSocketManager, p: payload::WindowClosed) {
    emit(ws, &WindowClosedEvent { payload: p }).await;
}

pub async fn attendance_marked(ws: &WebSocketManager, p: payload::AttendanceMarked) {
    emit(ws, &AttendanceMarkedEvent { payload: p }).await;
}

pub async fn presence_event(ws: &WebSocketManager, p: payload::PresenceEvent) {
    emit(ws, &PresenceEventRecorded { payload: p }).await;
}

pub async fn teacher_marked(ws: &WebSocketManager, p: payload::TeacherMarked) {
    emit(ws, &TeacherMarkedEvent { payload: p }).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, timeout};

    #[tokio::test]
    async fn marked_event_lands_on_the_lecture_topic() {
        let ws = WebSocketManager::new();
        let mut rx = ws.subscribe("lecture:5").await;

        attendance_marked(
            &ws,
            payload::AttendanceMarked {
                lecture_id: 5,
                student_id: 7,
                method: "FACE".into(),
                confidence: 0.9,
            },
        )
        .await;

        let raw = timeout(Duration::from_millis(50), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["event"], "lecture.attendance_marked");
        assert_eq!(v["payload"]["student_id"], 7);
    }

    #[tokio::test]
    async fn teacher_marked_event_lands_on_the_teacher_topic() {
        let ws = WebSocketManager::new();
        let mut rx = ws.subscribe("teacher:10").await;

        teacher_marked(
            &ws,
            payload::TeacherMarked {
                teacher_id: 10,
                date: "2026-03-02".into(),
                lecture_id: None,
                method: "MANUAL".into(),
            },
        )
        .await;

        let raw = timeout(Duration::from_millis(50), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["event"], "teacher.attendance_marked");
        assert_eq!(v["topic"], "teacher:10");
        assert_eq!(v["payload"]["teacher_id"], 10);
    }
}
