//! HTTP and WebSocket surface for the attendance backend.
//!
//! Handlers do no domain work themselves: each one parses the request,
//! calls a `services` operation, maps the domain error onto a status code,
//! and emits the matching realtime event.

pub mod response;
pub mod routes;
pub mod ws;
