//! The attendance record surface: self-marking through a window, live
//! per-lecture status, and per-student history with duration breakdown.
//!
//! Realtime pushes observe these operations but are never the source of
//! truth — `live_status` reconstructs the same state from the store alone.

use chrono::{DateTime, NaiveDate, Utc};
use db::models::{
    attendance_record::{self, AttendanceStatus, VerificationMethod},
    attendance_request::{self, WindowStatus},
    lecture::{self, LectureStatus},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::error::{AttendanceError, Result};
use crate::lecture::LectureService;
use crate::presence::PresenceService;
use crate::window::WindowService;

#[derive(Debug, Clone)]
pub struct MarkViaWindow {
    pub request_id: i64,
    pub student_id: i64,
    pub verification_method: VerificationMethod,
    pub confidence: f64,
}

/// One student's row in a live status readout.
#[derive(Debug, Clone, Serialize)]
pub struct StudentState {
    pub student_id: i64,
    pub status: AttendanceStatus,
    pub cumulative_duration_minutes: i32,
    pub entry_exit_count: i32,
    pub verification_method: VerificationMethod,
    pub confidence_score: f64,
    pub marked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LectureLiveStatus {
    pub lecture_id: i64,
    pub lecture_status: LectureStatus,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    /// The most recent window, with lazy expiry already applied.
    pub latest_window: Option<attendance_request::Model>,
    pub students: Vec<StudentState>,
}

/// One lecture's outcome in a student's history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub lecture_id: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub room_number: Option<String>,
    pub status: AttendanceStatus,
    pub cumulative_duration_minutes: i32,
    pub verification_method: VerificationMethod,
    pub confidence_score: f64,
    pub marked_at: DateTime<Utc>,
}

pub struct AttendanceService;

impl AttendanceService {
    /// Marks a student through an open window after biometric (or manual/GPS)
    /// verification has already succeeded. The first caller for the
    /// (lecture, student) key wins; a concurrent loser observes
    /// `AlreadyMarked`. The status stored here is PRESENT — the lecture-end
    /// duration pass reconciles it against actual time in the room.
    pub async fn mark_via_window(
        db: &DatabaseConnection,
        params: MarkViaWindow,
        now: DateTime<Utc>,
    ) -> Result<attendance_record::Model> {
        let window = WindowService::mark_student(db, params.request_id, params.student_id, now).await?;
        debug_assert_eq!(window.status, WindowStatus::Active);

        let lecture = LectureService::get(db, window.lecture_id).await?;
        let summary = PresenceService::summarize(db, params.student_id, &lecture, now).await?;

        PresenceService::insert_record_once(
            db,
            lecture.id,
            params.student_id,
            AttendanceStatus::Present,
            params.verification_method,
            params.confidence,
            &summary,
            now,
        )
        .await
    }

    /// Live per-lecture readout: per-student state plus counts, rebuilt
    /// entirely from the store.
    pub async fn live_status(
        db: &DatabaseConnection,
        lecture_id: i64,
        now: DateTime<Utc>,
    ) -> Result<LectureLiveStatus> {
        let lecture = LectureService::get(db, lecture_id).await?;
        let latest_window = WindowService::latest_for_lecture(db, lecture_id, now).await?;

        let records = attendance_record::Entity::find()
            .filter(attendance_record::Column::LectureId.eq(lecture_id))
            .order_by_asc(attendance_record::Column::StudentId)
            .all(db)
            .await?;

        let mut status = LectureLiveStatus {
            lecture_id,
            lecture_status: lecture.status,
            present: 0,
            late: 0,
            absent: 0,
            latest_window,
            students: Vec::with_capacity(records.len()),
        };
        for rec in records {
            match rec.status {
                AttendanceStatus::Present => status.present += 1,
                AttendanceStatus::Late => status.late += 1,
                AttendanceStatus::Absent => status.absent += 1,
            }
            status.students.push(StudentState {
                student_id: rec.student_id,
                status: rec.status,
                cumulative_duration_minutes: rec.cumulative_duration_minutes,
                entry_exit_count: rec.entry_exit_count,
                verification_method: rec.verification_method,
                confidence_score: rec.confidence_score,
                marked_at: rec.marked_at,
            });
        }
        Ok(status)
    }

    /// A student's attendance across lectures, optionally bounded by the
    /// lecture's scheduled date.
    pub async fn student_history(
        db: &DatabaseConnection,
        student_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<HistoryEntry>> {
        let rows = attendance_record::Entity::find()
            .filter(attendance_record::Column::StudentId.eq(student_id))
            .find_also_related(lecture::Entity)
            .all(db)
            .await?;

        let mut entries = Vec::new();
        for (rec, lec) in rows {
            let lec = lec.ok_or(AttendanceError::NotFound("lecture"))?;
            let day = lec.scheduled_start.date_naive();
            if from.is_some_and(|f| day < f) || to.is_some_and(|t| day > t) {
                continue;
            }
            entries.push(HistoryEntry {
                lecture_id: lec.id,
                scheduled_start: lec.scheduled_start,
                scheduled_end: lec.scheduled_end,
                room_number: lec.room_number,
                status: rec.status,
                cumulative_duration_minutes: rec.cumulative_duration_minutes,
                verification_method: rec.verification_method,
                confidence_score: rec.confidence_score,
                marked_at: rec.marked_at,
            });
        }
        entries.sort_by_key(|e| e.scheduled_start);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lecture::ScheduleLecture;
    use crate::presence::RecordEvent;
    use crate::window::OpenWindow;
    use chrono::TimeZone;
    use db::models::entry_exit_log::EventType;
    use db::test_utils::setup_test_db;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, d, h, m, 0).unwrap()
    }

    async fn lecture_with_window(
        db: &DatabaseConnection,
        day: u32,
    ) -> (lecture::Model, db::models::attendance_request::Model) {
        let l = LectureService::schedule(
            db,
            ScheduleLecture {
                section_id: 1,
                teacher_id: 10,
                scheduled_start: at(day, 10, 0),
                scheduled_end: at(day, 11, 0),
                room_number: Some("4006".into()),
            },
        )
        .await
        .unwrap();
        let l = LectureService::start(db, l.id, at(day, 10, 0)).await.unwrap();
        let w = WindowService::open(
            db,
            OpenWindow {
                lecture_id: l.id,
                teacher_id: 10,
                duration_minutes: 10,
            },
            at(day, 10, 0),
        )
        .await
        .unwrap();
        (l, w)
    }

    #[tokio::test]
    async fn racing_marks_leave_exactly_one_record() {
        let db = setup_test_db().await;
        let (l, w) = lecture_with_window(&db, 2).await;

        let params = MarkViaWindow {
            request_id: w.id,
            student_id: 7,
            verification_method: VerificationMethod::Face,
            confidence: 0.91,
        };
        AttendanceService::mark_via_window(&db, params.clone(), at(2, 10, 4))
            .await
            .unwrap();
        let err = AttendanceService::mark_via_window(&db, params, at(2, 10, 5))
            .await
            .unwrap_err();
        assert!(matches!(err, AttendanceError::AlreadyMarked));

        let all = attendance_record::Entity::find()
            .filter(attendance_record::Column::LectureId.eq(l.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn live_status_reconstructs_counts_from_the_store() {
        let db = setup_test_db().await;
        let (l, w) = lecture_with_window(&db, 2).await;

        for student in [1, 2, 3] {
            AttendanceService::mark_via_window(
                &db,
                MarkViaWindow {
                    request_id: w.id,
                    student_id: student,
                    verification_method: VerificationMethod::Face,
                    confidence: 0.9,
                },
                at(2, 10, 4),
            )
            .await
            .unwrap();
        }

        let status = AttendanceService::live_status(&db, l.id, at(2, 10, 5))
            .await
            .unwrap();
        assert_eq!(status.present, 3);
        assert_eq!(status.late, 0);
        assert_eq!(status.students.len(), 3);
        assert_eq!(status.lecture_status, LectureStatus::Ongoing);
        let window = status.latest_window.unwrap();
        assert_eq!(window.id, w.id);
        assert_eq!(window.status, WindowStatus::Active);

        // Read past the deadline: the same readout reports the window expired.
        let later = AttendanceService::live_status(&db, l.id, at(2, 11, 0))
            .await
            .unwrap();
        assert_eq!(later.latest_window.unwrap().status, WindowStatus::Expired);
    }

    #[tokio::test]
    async fn history_filters_by_date_range() {
        let db = setup_test_db().await;
        let (_, w1) = lecture_with_window(&db, 2).await;
        let (_, w2) = lecture_with_window(&db, 9).await;

        for (w, d) in [(&w1, 2), (&w2, 9)] {
            AttendanceService::mark_via_window(
                &db,
                MarkViaWindow {
                    request_id: w.id,
                    student_id: 7,
                    verification_method: VerificationMethod::Manual,
                    confidence: 1.0,
                },
                at(d, 10, 4),
            )
            .await
            .unwrap();
        }

        let all = AttendanceService::student_history(&db, 7, None, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let first_week = AttendanceService::student_history(
            &db,
            7,
            Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()),
            Some(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap()),
        )
        .await
        .unwrap();
        assert_eq!(first_week.len(), 1);
        assert_eq!(first_week[0].scheduled_start, at(2, 10, 0));
    }

    #[tokio::test]
    async fn final_pass_reconciles_a_self_mark_with_no_presence() {
        let db = setup_test_db().await;
        let (l, w) = lecture_with_window(&db, 2).await;

        // Student self-marks but never produces a single door event.
        AttendanceService::mark_via_window(
            &db,
            MarkViaWindow {
                request_id: w.id,
                student_id: 7,
                verification_method: VerificationMethod::Face,
                confidence: 0.95,
            },
            at(2, 10, 4),
        )
        .await
        .unwrap();

        LectureService::end(&db, l.id, at(2, 11, 0)).await.unwrap();

        // Zero minutes in the room reclassifies the mark to ABSENT: the final
        // pass covers record holders even when they produced no events. The
        // mark's provenance survives the reclassification.
        let rec = attendance_record::Entity::find_by_id((l.id, 7))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rec.status, AttendanceStatus::Absent);
        assert_eq!(rec.cumulative_duration_minutes, 0);
        assert_eq!(rec.verification_method, VerificationMethod::Face);
        assert_eq!(rec.confidence_score, 0.95);
    }

    #[tokio::test]
    async fn final_pass_keeps_a_self_mark_backed_by_enough_presence() {
        let db = setup_test_db().await;
        let (l, w) = lecture_with_window(&db, 2).await;

        AttendanceService::mark_via_window(
            &db,
            MarkViaWindow {
                request_id: w.id,
                student_id: 8,
                verification_method: VerificationMethod::Face,
                confidence: 0.9,
            },
            at(2, 10, 4),
        )
        .await
        .unwrap();
        PresenceService::record_event(
            &db,
            RecordEvent {
                user_id: 8,
                lecture_id: l.id,
                event_type: EventType::Entry,
                recorded_at: at(2, 10, 5),
                confidence: Some(0.9),
                room_number: None,
            },
        )
        .await
        .unwrap();

        // 55 open minutes close against the lecture end, over the 50 threshold.
        LectureService::end(&db, l.id, at(2, 11, 0)).await.unwrap();

        let rec = attendance_record::Entity::find_by_id((l.id, 8))
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rec.status, AttendanceStatus::Present);
        assert_eq!(rec.cumulative_duration_minutes, 55);
    }
}
