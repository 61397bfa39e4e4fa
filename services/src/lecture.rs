//! Lecture lifecycle: SCHEDULED -> ONGOING -> COMPLETED, with CANCELLED
//! reachable from the two non-terminal states. Every other transition is
//! rejected with `InvalidStateTransition` and performs no mutation.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use db::models::{
    attendance_record::{self, VerificationMethod},
    lecture::{self, LectureStatus},
};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QuerySelect,
};

use crate::error::{AttendanceError, Result};
use crate::presence::PresenceService;

#[derive(Debug, Clone)]
pub struct ScheduleLecture {
    pub section_id: i64,
    pub teacher_id: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub room_number: Option<String>,
}

pub struct LectureService;

impl LectureService {
    pub async fn schedule(
        db: &DatabaseConnection,
        params: ScheduleLecture,
    ) -> Result<lecture::Model> {
        if params.scheduled_end <= params.scheduled_start {
            return Err(AttendanceError::Validation(
                "scheduled_end must be after scheduled_start".into(),
            ));
        }

        let now = Utc::now();
        let row = lecture::ActiveModel {
            section_id: Set(params.section_id),
            teacher_id: Set(params.teacher_id),
            scheduled_start: Set(params.scheduled_start),
            scheduled_end: Set(params.scheduled_end),
            actual_start: Set(None),
            actual_end: Set(None),
            room_number: Set(params.room_number),
            status: Set(LectureStatus::Scheduled),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = lecture::Entity::insert(row).exec_with_returning(db).await?;
        log::info!(
            "lecture {} scheduled for section {} ({} - {})",
            created.id,
            created.section_id,
            created.scheduled_start,
            created.scheduled_end
        );
        Ok(created)
    }

    pub async fn get(db: &DatabaseConnection, lecture_id: i64) -> Result<lecture::Model> {
        lecture::Entity::find_by_id(lecture_id)
            .one(db)
            .await?
            .ok_or(AttendanceError::NotFound("lecture"))
    }

    /// SCHEDULED -> ONGOING. Sets `actual_start` and nothing else.
    pub async fn start(
        db: &DatabaseConnection,
        lecture_id: i64,
        now: DateTime<Utc>,
    ) -> Result<lecture::Model> {
        let current = Self::get(db, lecture_id).await?;
        Self::ensure_transition(current.status, LectureStatus::Ongoing)?;

        let mut active = current.into_active_model();
        active.status = Set(LectureStatus::Ongoing);
        active.actual_start = Set(Some(now));
        active.updated_at = Set(now);
        let updated = lecture::Entity::update(active).exec(db).await?;

        log::info!("lecture {} started at {}", updated.id, now);
        Ok(updated)
    }

    /// ONGOING -> COMPLETED. Sets `actual_end`, then runs the final duration
    /// pass over every student observed in the lecture's event stream.
    pub async fn end(
        db: &DatabaseConnection,
        lecture_id: i64,
        now: DateTime<Utc>,
    ) -> Result<lecture::Model> {
        let current = Self::get(db, lecture_id).await?;
        Self::ensure_transition(current.status, LectureStatus::Completed)?;

        let mut active = current.into_active_model();
        active.status = Set(LectureStatus::Completed);
        active.actual_end = Set(Some(now));
        active.updated_at = Set(now);
        let updated = lecture::Entity::update(active).exec(db).await?;

        let reconciled = Self::finalize_attendance(db, &updated, now).await?;
        log::info!(
            "lecture {} completed at {}; reconciled {} attendance record(s)",
            updated.id,
            now,
            reconciled
        );
        Ok(updated)
    }

    /// SCHEDULED|ONGOING -> CANCELLED.
    pub async fn cancel(
        db: &DatabaseConnection,
        lecture_id: i64,
        now: DateTime<Utc>,
    ) -> Result<lecture::Model> {
        let current = Self::get(db, lecture_id).await?;
        Self::ensure_transition(current.status, LectureStatus::Cancelled)?;

        let mut active = current.into_active_model();
        active.status = Set(LectureStatus::Cancelled);
        active.updated_at = Set(now);
        let updated = lecture::Entity::update(active).exec(db).await?;

        log::info!("lecture {} cancelled", updated.id);
        Ok(updated)
    }

    fn ensure_transition(from: LectureStatus, to: LectureStatus) -> Result<()> {
        let allowed = matches!(
            (from, to),
            (LectureStatus::Scheduled, LectureStatus::Ongoing)
                | (LectureStatus::Ongoing, LectureStatus::Completed)
                | (LectureStatus::Scheduled, LectureStatus::Cancelled)
                | (LectureStatus::Ongoing, LectureStatus::Cancelled)
        );
        if allowed {
            Ok(())
        } else {
            Err(AttendanceError::InvalidStateTransition { from, to })
        }
    }

    /// Recomputes cumulative duration and reclassifies for every student the
    /// lecture knows about: anyone with an entry/exit event, plus anyone who
    /// already holds an attendance record (a self-marker may have produced no
    /// sensor events at all). This pass is the single place where durations
    /// override whatever status a self-mark recorded earlier.
    pub async fn finalize_attendance(
        db: &DatabaseConnection,
        lecture: &lecture::Model,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let duration = lecture.scheduled_duration_minutes();
        let mut students: BTreeSet<i64> = PresenceService::observed_users(db, lecture.id)
            .await?
            .into_iter()
            .collect();
        let recorded = attendance_record::Entity::find()
            .select_only()
            .column(attendance_record::Column::StudentId)
            .filter(attendance_record::Column::LectureId.eq(lecture.id))
            .into_tuple::<i64>()
            .all(db)
            .await?;
        students.extend(recorded);

        for &student_id in &students {
            let summary = PresenceService::summarize(db, student_id, lecture, now).await?;
            let status = PresenceService::classify(summary.cumulative_minutes, duration);
            PresenceService::upsert_record(
                db,
                lecture.id,
                student_id,
                status,
                VerificationMethod::Face,
                summary.mean_confidence,
                &summary,
                now,
            )
            .await?;
        }

        Ok(students.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use db::test_utils::setup_test_db;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    async fn schedule(db: &DatabaseConnection) -> lecture::Model {
        LectureService::schedule(
            db,
            ScheduleLecture {
                section_id: 1,
                teacher_id: 10,
                scheduled_start: at(10, 0),
                scheduled_end: at(11, 0),
                room_number: Some("4006".into()),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn full_lifecycle_sets_actual_timestamps() {
        let db = setup_test_db().await;
        let l = schedule(&db).await;
        assert_eq!(l.status, LectureStatus::Scheduled);
        assert!(l.actual_start.is_none());

        let l = LectureService::start(&db, l.id, at(10, 1)).await.unwrap();
        assert_eq!(l.status, LectureStatus::Ongoing);
        assert_eq!(l.actual_start, Some(at(10, 1)));
        assert!(l.actual_end.is_none());

        let l = LectureService::end(&db, l.id, at(11, 0)).await.unwrap();
        assert_eq!(l.status, LectureStatus::Completed);
        assert_eq!(l.actual_end, Some(at(11, 0)));
    }

    #[tokio::test]
    async fn illegal_transitions_are_rejected_without_mutation() {
        let db = setup_test_db().await;
        let l = schedule(&db).await;

        // end() straight from SCHEDULED
        let err = LectureService::end(&db, l.id, at(11, 0)).await.unwrap_err();
        assert!(matches!(
            err,
            AttendanceError::InvalidStateTransition {
                from: LectureStatus::Scheduled,
                to: LectureStatus::Completed
            }
        ));
        let fresh = LectureService::get(&db, l.id).await.unwrap();
        assert_eq!(fresh.status, LectureStatus::Scheduled);
        assert!(fresh.actual_end.is_none());

        // complete, then try every transition out of the terminal state
        LectureService::start(&db, l.id, at(10, 0)).await.unwrap();
        LectureService::end(&db, l.id, at(11, 0)).await.unwrap();
        assert!(LectureService::start(&db, l.id, at(11, 5)).await.is_err());
        assert!(LectureService::cancel(&db, l.id, at(11, 5)).await.is_err());
        assert!(LectureService::end(&db, l.id, at(11, 5)).await.is_err());
    }

    #[tokio::test]
    async fn cancel_is_reachable_from_scheduled_and_ongoing_only() {
        let db = setup_test_db().await;

        let a = schedule(&db).await;
        let a = LectureService::cancel(&db, a.id, at(9, 0)).await.unwrap();
        assert_eq!(a.status, LectureStatus::Cancelled);
        // cancelled is terminal
        assert!(LectureService::start(&db, a.id, at(9, 5)).await.is_err());

        let b = schedule(&db).await;
        LectureService::start(&db, b.id, at(10, 0)).await.unwrap();
        let b = LectureService::cancel(&db, b.id, at(10, 30)).await.unwrap();
        assert_eq!(b.status, LectureStatus::Cancelled);
    }

    #[tokio::test]
    async fn schedule_rejects_inverted_time_range() {
        let db = setup_test_db().await;
        let err = LectureService::schedule(
            &db,
            ScheduleLecture {
                section_id: 1,
                teacher_id: 10,
                scheduled_start: at(11, 0),
                scheduled_end: at(10, 0),
                room_number: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AttendanceError::Validation(_)));
    }
}
