//! Time-boxed self-marking windows.
//!
//! Expiry is lazy: there is no background sweep, every read or write path
//! runs the same check before trusting the stored status. Because a window
//! never un-expires, the only staleness is the bounded gap between "true
//! boundary" and "next access".

use chrono::{DateTime, Duration, Utc};
use db::models::{
    attendance_request::{self, WindowStatus},
    attendance_request_mark,
    lecture,
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};

use crate::error::{AttendanceError, Result};

/// Self-mark windows stay short by design.
pub const MIN_WINDOW_MINUTES: i32 = 1;
pub const MAX_WINDOW_MINUTES: i32 = 30;

#[derive(Debug, Clone)]
pub struct OpenWindow {
    pub lecture_id: i64,
    pub teacher_id: i64,
    pub duration_minutes: i32,
}

pub struct WindowService;

impl WindowService {
    /// Opens a new window for a lecture. Only the lecture's teacher may open
    /// one, and an existing ACTIVE window for the same lecture is superseded:
    /// it is closed in the same call before the new row is inserted.
    pub async fn open(
        db: &DatabaseConnection,
        params: OpenWindow,
        now: DateTime<Utc>,
    ) -> Result<attendance_request::Model> {
        if !(MIN_WINDOW_MINUTES..=MAX_WINDOW_MINUTES).contains(&params.duration_minutes) {
            return Err(AttendanceError::Validation(format!(
                "duration_minutes must be between {} and {}",
                MIN_WINDOW_MINUTES, MAX_WINDOW_MINUTES
            )));
        }

        let lecture = lecture::Entity::find_by_id(params.lecture_id)
            .one(db)
            .await?
            .ok_or(AttendanceError::NotFound("lecture"))?;
        if lecture.teacher_id != params.teacher_id {
            return Err(AttendanceError::Forbidden(
                "only the lecture's teacher may open an attendance window",
            ));
        }

        // Supersede: any still-active window for this lecture is closed now.
        let open_windows = attendance_request::Entity::find()
            .filter(attendance_request::Column::LectureId.eq(params.lecture_id))
            .filter(attendance_request::Column::Status.eq(WindowStatus::Active))
            .all(db)
            .await?;
        for prior in open_windows {
            let superseded = Self::apply_lazy_expiry(db, prior, now).await?;
            if superseded.status == WindowStatus::Active {
                let mut active = superseded.into_active_model();
                active.status = Set(WindowStatus::Closed);
                attendance_request::Entity::update(active).exec(db).await?;
            }
        }

        let row = attendance_request::ActiveModel {
            lecture_id: Set(params.lecture_id),
            teacher_id: Set(params.teacher_id),
            duration_minutes: Set(params.duration_minutes),
            created_at: Set(now),
            expires_at: Set(now + Duration::minutes(params.duration_minutes as i64)),
            status: Set(WindowStatus::Active),
            ..Default::default()
        };
        let created = attendance_request::Entity::insert(row)
            .exec_with_returning(db)
            .await?;

        log::info!(
            "attendance window {} opened for lecture {} until {}",
            created.id,
            created.lecture_id,
            created.expires_at
        );
        Ok(created)
    }

    /// Fetches a window with lazy expiry applied: if the deadline has passed
    /// while the row still says ACTIVE, the row is flipped to EXPIRED before
    /// it is returned. The flip is one-directional and never reversed.
    pub async fn fetch(
        db: &DatabaseConnection,
        request_id: i64,
        now: DateTime<Utc>,
    ) -> Result<attendance_request::Model> {
        let window = attendance_request::Entity::find_by_id(request_id)
            .one(db)
            .await?
            .ok_or(AttendanceError::NotFound("attendance window"))?;
        Self::apply_lazy_expiry(db, window, now).await
    }

    /// The most recently opened window for a lecture, if any, with lazy
    /// expiry applied before it is returned.
    pub async fn latest_for_lecture(
        db: &DatabaseConnection,
        lecture_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<attendance_request::Model>> {
        let window = attendance_request::Entity::find()
            .filter(attendance_request::Column::LectureId.eq(lecture_id))
            .order_by_desc(attendance_request::Column::CreatedAt)
            .one(db)
            .await?;
        match window {
            Some(w) => Ok(Some(Self::apply_lazy_expiry(db, w, now).await?)),
            None => Ok(None),
        }
    }

    async fn apply_lazy_expiry(
        db: &DatabaseConnection,
        window: attendance_request::Model,
        now: DateTime<Utc>,
    ) -> Result<attendance_request::Model> {
        if window.status == WindowStatus::Active && now > window.expires_at {
            let mut active = window.into_active_model();
            active.status = Set(WindowStatus::Expired);
            let updated = attendance_request::Entity::update(active).exec(db).await?;
            log::debug!("attendance window {} expired lazily", updated.id);
            return Ok(updated);
        }
        Ok(window)
    }

    /// Adds a student to the window's marked set. Duplicate adds are no-ops.
    pub async fn mark_student(
        db: &DatabaseConnection,
        request_id: i64,
        student_id: i64,
        now: DateTime<Utc>,
    ) -> Result<attendance_request::Model> {
        let window = Self::fetch(db, request_id, now).await?;
        match window.status {
            WindowStatus::Expired => return Err(AttendanceError::WindowExpired),
            WindowStatus::Closed => return Err(AttendanceError::WindowClosed),
            WindowStatus::Active => {}
        }

        let mark = attendance_request_mark::ActiveModel {
            request_id: Set(request_id),
            student_id: Set(student_id),
            marked_at: Set(now),
        };
        match attendance_request_mark::Entity::insert(mark).exec(db).await {
            Ok(_) => {}
            // set semantics: the student was already in the marked set
            Err(err) => match AttendanceError::from_insert_err(err) {
                AttendanceError::AlreadyMarked => {}
                other => return Err(other),
            },
        }

        Ok(window)
    }

    /// Manual early termination. Only the owning teacher may close, and only
    /// an ACTIVE window can transition to CLOSED.
    pub async fn close(
        db: &DatabaseConnection,
        request_id: i64,
        teacher_id: i64,
        now: DateTime<Utc>,
    ) -> Result<attendance_request::Model> {
        let window = Self::fetch(db, request_id, now).await?;
        if window.teacher_id != teacher_id {
            return Err(AttendanceError::Forbidden(
                "only the owning teacher may close an attendance window",
            ));
        }
        match window.status {
            WindowStatus::Expired => return Err(AttendanceError::WindowExpired),
            WindowStatus::Closed => return Err(AttendanceError::WindowClosed),
            WindowStatus::Active => {}
        }

        let mut active = window.into_active_model();
        active.status = Set(WindowStatus::Closed);
        let updated = attendance_request::Entity::update(active).exec(db).await?;
        log::info!("attendance window {} closed by teacher {}", request_id, teacher_id);
        Ok(updated)
    }

    /// The window's marked set, in marking order.
    pub async fn marked_students(db: &DatabaseConnection, request_id: i64) -> Result<Vec<i64>> {
        let marks = attendance_request_mark::Entity::find()
            .filter(attendance_request_mark::Column::RequestId.eq(request_id))
            .order_by_asc(attendance_request_mark::Column::MarkedAt)
            .all(db)
            .await?;
        Ok(marks.into_iter().map(|m| m.student_id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lecture::{LectureService, ScheduleLecture};
    use chrono::TimeZone;
    use db::test_utils::setup_test_db;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    async fn lecture(db: &DatabaseConnection, teacher_id: i64) -> lecture::Model {
        LectureService::schedule(
            db,
            ScheduleLecture {
                section_id: 1,
                teacher_id,
                scheduled_start: at(10, 0),
                scheduled_end: at(11, 0),
                room_number: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn worked_scenario_five_minute_window() {
        let db = setup_test_db().await;
        let l = lecture(&db, 10).await;

        let w = WindowService::open(
            &db,
            OpenWindow {
                lecture_id: l.id,
                teacher_id: 10,
                duration_minutes: 5,
            },
            at(10, 0),
        )
        .await
        .unwrap();
        assert_eq!(w.expires_at, at(10, 5));

        // 10:04 succeeds
        WindowService::mark_student(&db, w.id, 7, at(10, 4)).await.unwrap();
        assert_eq!(WindowService::marked_students(&db, w.id).await.unwrap(), vec![7]);

        // 10:06 is past the deadline
        let err = WindowService::mark_student(&db, w.id, 8, at(10, 6)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::WindowExpired));
    }

    #[tokio::test]
    async fn expiry_is_monotonic_across_reads() {
        let db = setup_test_db().await;
        let l = lecture(&db, 10).await;
        let w = WindowService::open(
            &db,
            OpenWindow {
                lecture_id: l.id,
                teacher_id: 10,
                duration_minutes: 1,
            },
            at(10, 0),
        )
        .await
        .unwrap();

        let expired = WindowService::fetch(&db, w.id, at(10, 2)).await.unwrap();
        assert_eq!(expired.status, WindowStatus::Expired);

        // A later read with an earlier clock still sees EXPIRED — the flip
        // persisted and is never reversed.
        let again = WindowService::fetch(&db, w.id, at(10, 0)).await.unwrap();
        assert_eq!(again.status, WindowStatus::Expired);
        assert!(again.is_expired(at(10, 0)));
    }

    #[tokio::test]
    async fn duplicate_marks_are_idempotent() {
        let db = setup_test_db().await;
        let l = lecture(&db, 10).await;
        let w = WindowService::open(
            &db,
            OpenWindow {
                lecture_id: l.id,
                teacher_id: 10,
                duration_minutes: 10,
            },
            at(10, 0),
        )
        .await
        .unwrap();

        WindowService::mark_student(&db, w.id, 7, at(10, 1)).await.unwrap();
        WindowService::mark_student(&db, w.id, 7, at(10, 2)).await.unwrap();
        assert_eq!(WindowService::marked_students(&db, w.id).await.unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn opening_supersedes_the_active_window() {
        let db = setup_test_db().await;
        let l = lecture(&db, 10).await;

        let first = WindowService::open(
            &db,
            OpenWindow {
                lecture_id: l.id,
                teacher_id: 10,
                duration_minutes: 10,
            },
            at(10, 0),
        )
        .await
        .unwrap();
        let second = WindowService::open(
            &db,
            OpenWindow {
                lecture_id: l.id,
                teacher_id: 10,
                duration_minutes: 10,
            },
            at(10, 2),
        )
        .await
        .unwrap();

        let first = WindowService::fetch(&db, first.id, at(10, 3)).await.unwrap();
        assert_eq!(first.status, WindowStatus::Closed);
        let second = WindowService::fetch(&db, second.id, at(10, 3)).await.unwrap();
        assert_eq!(second.status, WindowStatus::Active);
    }

    #[tokio::test]
    async fn only_the_owner_may_open_or_close() {
        let db = setup_test_db().await;
        let l = lecture(&db, 10).await;

        let err = WindowService::open(
            &db,
            OpenWindow {
                lecture_id: l.id,
                teacher_id: 99,
                duration_minutes: 5,
            },
            at(10, 0),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AttendanceError::Forbidden(_)));

        let w = WindowService::open(
            &db,
            OpenWindow {
                lecture_id: l.id,
                teacher_id: 10,
                duration_minutes: 5,
            },
            at(10, 0),
        )
        .await
        .unwrap();
        let err = WindowService::close(&db, w.id, 99, at(10, 1)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::Forbidden(_)));

        let closed = WindowService::close(&db, w.id, 10, at(10, 1)).await.unwrap();
        assert_eq!(closed.status, WindowStatus::Closed);

        // marking a closed window reports CLOSED, not EXPIRED
        let err = WindowService::mark_student(&db, w.id, 7, at(10, 2)).await.unwrap_err();
        assert!(matches!(err, AttendanceError::WindowClosed));
    }

    #[tokio::test]
    async fn duration_bounds_are_validated() {
        let db = setup_test_db().await;
        let l = lecture(&db, 10).await;
        for bad in [0, 31, -5] {
            let err = WindowService::open(
                &db,
                OpenWindow {
                    lecture_id: l.id,
                    teacher_id: 10,
                    duration_minutes: bad,
                },
                at(10, 0),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AttendanceError::Validation(_)));
        }
    }
}
