//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness probe
//! - `/lectures` → lecture lifecycle, live status, window opening
//! - `/attendance-windows` → window close and self-marking
//! - `/door` → presence sensor event ingestion
//! - `/students` → per-student attendance history
//! - `/teachers` → teacher self-marking

use axum::Router;
use common::state::AppState;

pub mod door;
pub mod health;
pub mod lectures;
pub mod students;
pub mod teachers;
pub mod windows;

/// Builds the complete application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health::health_routes())
        .nest("/lectures", lectures::lecture_routes())
        .nest("/attendance-windows", windows::window_routes())
        .nest("/door", door::door_routes())
        .nest("/students", students::student_routes())
        .nest("/teachers", teachers::teacher_routes())
        .with_state(app_state)
}
