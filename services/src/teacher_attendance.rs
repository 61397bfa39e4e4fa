//! Teacher presence dedup: at most one PRESENT row per (teacher, date) when
//! day-scoped, or per (teacher, date, lecture) when lecture-scoped. The
//! store's unique index is the ground truth; the constraint collision is
//! mapped to `AlreadyMarked` instead of surfacing as a database failure.

use chrono::{DateTime, NaiveDate, Utc};
use db::models::teacher_attendance::{self, TeacherVerificationMethod};
use sea_orm::{ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::error::{AttendanceError, Result};

#[derive(Debug, Clone)]
pub struct MarkTeacherAttendance {
    pub teacher_id: i64,
    pub date: NaiveDate,
    /// `None` marks the whole day; `Some` scopes the mark to one lecture.
    pub lecture_id: Option<i64>,
    pub verification_method: TeacherVerificationMethod,
    pub confidence: f64,
}

pub struct TeacherAttendanceService;

impl TeacherAttendanceService {
    pub async fn mark(
        db: &DatabaseConnection,
        params: MarkTeacherAttendance,
        now: DateTime<Utc>,
    ) -> Result<teacher_attendance::Model> {
        // SQLite unique indexes treat NULLs as distinct, so the day-scoped
        // key needs an explicit pre-check; the lecture-scoped key rides the
        // index alone.
        if params.lecture_id.is_none() {
            let existing = teacher_attendance::Entity::find()
                .filter(teacher_attendance::Column::TeacherId.eq(params.teacher_id))
                .filter(teacher_attendance::Column::Date.eq(params.date))
                .filter(teacher_attendance::Column::LectureId.is_null())
                .one(db)
                .await?;
            if existing.is_some() {
                return Err(AttendanceError::AlreadyMarked);
            }
        }

        let row = teacher_attendance::ActiveModel {
            teacher_id: Set(params.teacher_id),
            date: Set(params.date),
            lecture_id: Set(params.lecture_id),
            marked_at: Set(now),
            verification_method: Set(params.verification_method),
            confidence: Set(params.confidence),
            ..Default::default()
        };

        let created = teacher_attendance::Entity::insert(row)
            .exec_with_returning(db)
            .await
            .map_err(AttendanceError::from_insert_err)?;

        log::info!(
            "teacher {} marked present for {} (lecture: {:?}, via {})",
            created.teacher_id,
            created.date,
            created.lecture_id,
            created.verification_method
        );
        Ok(created)
    }

    pub async fn for_date(
        db: &DatabaseConnection,
        teacher_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<teacher_attendance::Model>> {
        Ok(teacher_attendance::Entity::find()
            .filter(teacher_attendance::Column::TeacherId.eq(teacher_id))
            .filter(teacher_attendance::Column::Date.eq(date))
            .all(db)
            .await?)
    }
}
