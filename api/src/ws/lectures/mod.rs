use axum::{Router, routing::get};
use common::state::AppState;

pub mod emit;
pub mod handlers;
pub mod payload;
pub mod topics;

use handlers::lecture_ws_handler;

pub fn ws_lecture_routes() -> Router<AppState> {
    Router::new().route("/{lecture_id}", get(lecture_ws_handler))
}
