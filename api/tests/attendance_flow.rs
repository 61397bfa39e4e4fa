//! Full-flow test over the real router: schedule a lecture, start it, open a
//! window, self-mark, check live status, end the lecture.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use common::state::AppState;
use common::ws::WebSocketManager;
use db::test_utils::setup_test_db;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = setup_test_db().await;
    let app_state = AppState::new(db, WebSocketManager::new());
    Router::new()
        .nest("/api", api::routes::routes(app_state.clone()))
        .nest("/ws", api::ws::ws_routes(app_state))
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn multipart_mark(student_id: i64, method: &str) -> (String, Body) {
    let boundary = "attendance-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"student_id\"\r\n\r\n{student_id}\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"method\"\r\n\r\n{method}\r\n\
         --{boundary}--\r\n"
    );
    (
        format!("multipart/form-data; boundary={boundary}"),
        Body::from(body),
    )
}

async fn send_mark(app: &Router, request_id: i64, student_id: i64) -> (StatusCode, Value) {
    let (content_type, body) = multipart_mark(student_id, "MANUAL");
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/attendance-windows/{request_id}/mark"))
        .header(CONTENT_TYPE, content_type)
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_endpoint_answers() {
    let app = test_app().await;
    let (status, body) = send_json(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn schedule_start_mark_status_end() {
    let app = test_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/lectures",
        Some(json!({
            "section_id": 1,
            "teacher_id": 10,
            "scheduled_start": "2026-03-02T10:00:00Z",
            "scheduled_end": "2026-03-02T11:00:00Z",
            "room_number": "4006"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let lecture_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "SCHEDULED");

    let (status, body) =
        send_json(&app, "PUT", &format!("/api/lectures/{lecture_id}/start"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ONGOING");

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/lectures/{lecture_id}/attendance-window"),
        Some(json!({ "teacher_id": 10, "duration_minutes": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let request_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "ACTIVE");

    let (status, body) = send_mark(&app, request_id, 7).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // Second mark for the same student is an idempotent 200.
    let (status, body) = send_mark(&app, request_id, 7).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Attendance already marked");

    let (status, body) =
        send_json(&app, "GET", &format!("/api/lectures/{lecture_id}/status"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["present"], 1);
    assert_eq!(body["data"]["students"][0]["student_id"], 7);

    let (status, body) =
        send_json(&app, "PUT", &format!("/api/lectures/{lecture_id}/end"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "COMPLETED");

    // Completed lectures reject further transitions.
    let (status, _) =
        send_json(&app, "PUT", &format!("/api/lectures/{lecture_id}/start"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn door_events_require_an_ongoing_lecture() {
    let app = test_app().await;

    let (_, body) = send_json(
        &app,
        "POST",
        "/api/lectures",
        Some(json!({
            "section_id": 1,
            "teacher_id": 10,
            "scheduled_start": "2026-03-02T10:00:00Z",
            "scheduled_end": "2026-03-02T11:00:00Z"
        })),
    )
    .await;
    let lecture_id = body["data"]["id"].as_i64().unwrap();

    let event = json!({
        "user_id": 7,
        "lecture_id": lecture_id,
        "event_type": "ENTRY",
        "recorded_at": "2026-03-02T10:05:00Z"
    });

    // Scheduled lecture: rejected.
    let (status, _) = send_json(&app, "POST", "/api/door/events", Some(event.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send_json(&app, "PUT", &format!("/api/lectures/{lecture_id}/start"), None).await;

    let (status, body) = send_json(&app, "POST", "/api/door/events", Some(event)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn wrong_teacher_cannot_open_a_window() {
    let app = test_app().await;

    let (_, body) = send_json(
        &app,
        "POST",
        "/api/lectures",
        Some(json!({
            "section_id": 1,
            "teacher_id": 10,
            "scheduled_start": "2026-03-02T10:00:00Z",
            "scheduled_end": "2026-03-02T11:00:00Z"
        })),
    )
    .await;
    let lecture_id = body["data"]["id"].as_i64().unwrap();
    send_json(&app, "PUT", &format!("/api/lectures/{lecture_id}/start"), None).await;

    let (status, body) = send_json(
        &app,
        "POST",
        &format!("/api/lectures/{lecture_id}/attendance-window"),
        Some(json!({ "teacher_id": 99, "duration_minutes": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn student_history_shows_marked_lectures() {
    let app = test_app().await;

    let (_, body) = send_json(
        &app,
        "POST",
        "/api/lectures",
        Some(json!({
            "section_id": 1,
            "teacher_id": 10,
            "scheduled_start": "2026-03-02T10:00:00Z",
            "scheduled_end": "2026-03-02T11:00:00Z"
        })),
    )
    .await;
    let lecture_id = body["data"]["id"].as_i64().unwrap();
    send_json(&app, "PUT", &format!("/api/lectures/{lecture_id}/start"), None).await;

    let (_, body) = send_json(
        &app,
        "POST",
        &format!("/api/lectures/{lecture_id}/attendance-window"),
        Some(json!({ "teacher_id": 10, "duration_minutes": 10 })),
    )
    .await;
    let request_id = body["data"]["id"].as_i64().unwrap();
    send_mark(&app, request_id, 7).await;

    let (status, body) = send_json(&app, "GET", "/api/students/7/attendance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["lecture_id"], lecture_id);

    // Range that excludes the lecture's date.
    let (_, body) = send_json(
        &app,
        "GET",
        "/api/students/7/attendance?from=2026-04-01&to=2026-04-30",
        None,
    )
    .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn teacher_marks_once_per_day() {
    let app = test_app().await;
    let boundary = "attendance-test-boundary";
    let form = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"method\"\r\n\r\nMANUAL\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"date\"\r\n\r\n2026-03-02\r\n\
         --{boundary}--\r\n"
    );

    let send = || async {
        let request = Request::builder()
            .method("POST")
            .uri("/api/teachers/10/attendance")
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(form.clone()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    };

    let (status, body) = send().await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["verification_method"], "MANUAL");

    let (status, body) = send().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Teacher attendance already marked");
}

#[tokio::test]
async fn event_stream_routes_are_wired_for_lectures_and_teachers() {
    let app = test_app().await;

    // A plain GET is rejected by the upgrade handshake, not by the router.
    for uri in ["/ws/lectures/5", "/ws/teachers/10"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_ne!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
