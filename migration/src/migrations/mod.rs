pub mod m202601050001_create_lectures;
pub mod m202601050002_create_attendance_requests;
pub mod m202601050003_create_entry_exit_logs;
pub mod m202601050004_create_attendance_records;
pub mod m202601050005_create_teacher_attendance;
