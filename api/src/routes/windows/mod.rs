use axum::{
    Router,
    routing::{post, put},
};
use common::state::AppState;

mod post;
mod put;

pub use post::mark_attendance;
pub use put::close_window;

pub fn window_routes() -> Router<AppState> {
    Router::new()
        .route("/{request_id}/close", put(close_window))
        .route("/{request_id}/mark", post(mark_attendance))
}
