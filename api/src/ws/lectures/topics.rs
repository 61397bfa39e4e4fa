/// Topic carrying every event for one lecture: lifecycle, windows, marks,
/// door events.
pub fn lecture_topic(lecture_id: i64) -> String {
    format!("lecture:{lecture_id}")
}

/// Topic for events addressed to one teacher across lectures.
pub fn teacher_topic(teacher_id: i64) -> String {
    format!("teacher:{teacher_id}")
}
