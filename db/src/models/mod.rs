pub mod attendance_record;
pub mod attendance_request;
pub mod attendance_request_mark;
pub mod entry_exit_log;
pub mod lecture;
pub mod teacher_attendance;

pub use attendance_record::Entity as AttendanceRecord;
pub use attendance_request::Entity as AttendanceRequest;
pub use attendance_request_mark::Entity as AttendanceRequestMark;
pub use entry_exit_log::Entity as EntryExitLog;
pub use lecture::Entity as Lecture;
pub use teacher_attendance::Entity as TeacherAttendance;
