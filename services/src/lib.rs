pub mod attendance;
pub mod error;
pub mod face_fallback;
pub mod lecture;
pub mod presence;
pub mod teacher_attendance;
pub mod window;

pub use error::AttendanceError;
