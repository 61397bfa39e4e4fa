//! Presence tracking: entry/exit event ingestion and duration aggregation.
//!
//! Events arrive out of order and from multiple concurrent sensors; the
//! aggregation reads by timestamp and is therefore invariant under insertion
//! order. Writers never mutate or delete rows.

use chrono::{DateTime, Utc};
use common::config::AppConfig;
use db::models::{
    attendance_record::{self, AttendanceStatus, VerificationMethod},
    entry_exit_log::{self, EventType},
    lecture::{self, LectureStatus},
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::error::{AttendanceError, Result};

/// Parameters for one sensor detection.
#[derive(Debug, Clone)]
pub struct RecordEvent {
    pub user_id: i64,
    pub lecture_id: i64,
    pub event_type: EventType,
    pub recorded_at: DateTime<Utc>,
    pub confidence: Option<f64>,
    pub room_number: Option<String>,
}

/// Aggregate of one user's event stream for one lecture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresenceSummary {
    pub cumulative_minutes: i64,
    pub entry_exit_count: i32,
    pub last_entry_time: Option<DateTime<Utc>>,
    pub mean_confidence: f64,
}

pub struct PresenceService;

impl PresenceService {
    /// Appends one immutable row. Only an ongoing lecture accepts events —
    /// the lecture lifecycle gates the sensor stream.
    pub async fn record_event(
        db: &DatabaseConnection,
        params: RecordEvent,
    ) -> Result<entry_exit_log::Model> {
        let lecture = lecture::Entity::find_by_id(params.lecture_id)
            .one(db)
            .await?
            .ok_or(AttendanceError::NotFound("lecture"))?;

        if lecture.status != LectureStatus::Ongoing {
            return Err(AttendanceError::Validation(format!(
                "lecture {} is {} and not accepting presence events",
                lecture.id, lecture.status
            )));
        }

        let row = entry_exit_log::ActiveModel {
            user_id: Set(params.user_id),
            lecture_id: Set(params.lecture_id),
            event_type: Set(params.event_type),
            recorded_at: Set(params.recorded_at),
            confidence: Set(params.confidence),
            room_number: Set(params.room_number),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let row = entry_exit_log::Entity::insert(row)
            .exec_with_returning(db)
            .await?;

        log::debug!(
            "presence event: user {} {} lecture {} at {}",
            row.user_id,
            row.event_type,
            row.lecture_id,
            row.recorded_at
        );
        Ok(row)
    }

    /// Loads one user's events for a lecture in timestamp order and folds
    /// them into a presence summary.
    pub async fn summarize(
        db: &DatabaseConnection,
        user_id: i64,
        lecture: &lecture::Model,
        now: DateTime<Utc>,
    ) -> Result<PresenceSummary> {
        let events = entry_exit_log::Entity::find()
            .filter(entry_exit_log::Column::UserId.eq(user_id))
            .filter(entry_exit_log::Column::LectureId.eq(lecture.id))
            .order_by_asc(entry_exit_log::Column::RecordedAt)
            .all(db)
            .await?;

        Ok(Self::fold_events(&events, lecture.presence_boundary(now)))
    }

    /// Convenience wrapper returning only the cumulative minutes.
    pub async fn cumulative_duration_minutes(
        db: &DatabaseConnection,
        user_id: i64,
        lecture: &lecture::Model,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(Self::summarize(db, user_id, lecture, now).await?.cumulative_minutes)
    }

    /// Pairs each ENTRY with the next chronologically later EXIT and sums the
    /// spans. Malformed sequences degrade instead of raising: a second ENTRY
    /// while one is open is ignored, an EXIT with no open ENTRY is ignored,
    /// and a trailing open ENTRY is closed against `boundary` (the lecture's
    /// actual end once completed, otherwise "now"). Events must already be in
    /// timestamp order.
    pub fn fold_events(
        events: &[entry_exit_log::Model],
        boundary: Option<DateTime<Utc>>,
    ) -> PresenceSummary {
        let mut total = chrono::Duration::zero();
        let mut open_entry: Option<DateTime<Utc>> = None;
        let mut last_entry_time = None;
        let mut confidence_sum = 0.0;
        let mut confidence_n = 0u32;

        for ev in events {
            if let Some(c) = ev.confidence {
                confidence_sum += c;
                confidence_n += 1;
            }
            match ev.event_type {
                EventType::Entry => {
                    if open_entry.is_none() {
                        open_entry = Some(ev.recorded_at);
                    }
                    last_entry_time = Some(ev.recorded_at);
                }
                EventType::Exit => {
                    if let Some(start) = open_entry.take() {
                        total += ev.recorded_at - start;
                    }
                }
            }
        }

        if let (Some(start), Some(end)) = (open_entry, boundary) {
            if end > start {
                total += end - start;
            }
        }

        PresenceSummary {
            cumulative_minutes: total.num_minutes(),
            entry_exit_count: events.len() as i32,
            last_entry_time,
            mean_confidence: if confidence_n > 0 {
                confidence_sum / confidence_n as f64
            } else {
                0.0
            },
        }
    }

    /// Classifies a cumulative duration against the configured thresholds,
    /// scaled proportionally for lectures that are not exactly 60 minutes.
    pub fn classify(cumulative_minutes: i64, lecture_duration_minutes: i64) -> AttendanceStatus {
        let (full, partial) = {
            let cfg = AppConfig::global();
            (
                cfg.attendance_full_threshold_minutes as f64,
                cfg.attendance_partial_threshold_minutes as f64,
            )
        };

        let scale = if lecture_duration_minutes > 0 {
            lecture_duration_minutes as f64 / 60.0
        } else {
            1.0
        };
        let minutes = cumulative_minutes as f64;

        if minutes >= full * scale {
            AttendanceStatus::Present
        } else if minutes >= partial * scale {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Absent
        }
    }

    /// Distinct users that produced at least one event for the lecture.
    pub async fn observed_users(db: &DatabaseConnection, lecture_id: i64) -> Result<Vec<i64>> {
        let users = entry_exit_log::Entity::find()
            .select_only()
            .column(entry_exit_log::Column::UserId)
            .filter(entry_exit_log::Column::LectureId.eq(lecture_id))
            .distinct()
            .into_tuple::<i64>()
            .all(db)
            .await?;
        Ok(users)
    }

    /// Creates-or-updates the attendance record for (lecture, student) under
    /// the composite-key constraint. Safe under concurrent callers: the
    /// conflict target admits exactly one row and later writers update it.
    /// `marked_at`, `verification_method` and `confidence_score` keep their
    /// first-insert values — the duration pass refines outcome, not origin.
    pub async fn upsert_record(
        db: &DatabaseConnection,
        lecture_id: i64,
        student_id: i64,
        status: AttendanceStatus,
        method: VerificationMethod,
        confidence: f64,
        summary: &PresenceSummary,
        now: DateTime<Utc>,
    ) -> Result<attendance_record::Model> {
        let row = attendance_record::ActiveModel {
            lecture_id: Set(lecture_id),
            student_id: Set(student_id),
            marked_at: Set(now),
            status: Set(status),
            cumulative_duration_minutes: Set(summary.cumulative_minutes as i32),
            entry_exit_count: Set(summary.entry_exit_count),
            last_entry_time: Set(summary.last_entry_time),
            verification_method: Set(method),
            confidence_score: Set(confidence),
            updated_at: Set(now),
        };

        attendance_record::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    attendance_record::Column::LectureId,
                    attendance_record::Column::StudentId,
                ])
                .update_columns([
                    attendance_record::Column::Status,
                    attendance_record::Column::CumulativeDurationMinutes,
                    attendance_record::Column::EntryExitCount,
                    attendance_record::Column::LastEntryTime,
                    attendance_record::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(db)
            .await?;

        attendance_record::Entity::find_by_id((lecture_id, student_id))
            .one(db)
            .await?
            .ok_or(AttendanceError::NotFound("attendance record"))
    }

    /// Insert-only variant used by the self-mark path: the first caller for a
    /// (lecture, student) key wins, every later one observes `AlreadyMarked`.
    pub async fn insert_record_once(
        db: &DatabaseConnection,
        lecture_id: i64,
        student_id: i64,
        status: AttendanceStatus,
        method: VerificationMethod,
        confidence: f64,
        summary: &PresenceSummary,
        now: DateTime<Utc>,
    ) -> Result<attendance_record::Model> {
        let row = attendance_record::ActiveModel {
            lecture_id: Set(lecture_id),
            student_id: Set(student_id),
            marked_at: Set(now),
            status: Set(status),
            cumulative_duration_minutes: Set(summary.cumulative_minutes as i32),
            entry_exit_count: Set(summary.entry_exit_count),
            last_entry_time: Set(summary.last_entry_time),
            verification_method: Set(method),
            confidence_score: Set(confidence),
            updated_at: Set(now),
        };

        attendance_record::Entity::insert(row)
            .exec(db)
            .await
            .map_err(AttendanceError::from_insert_err)?;

        attendance_record::Entity::find_by_id((lecture_id, student_id))
            .one(db)
            .await?
            .ok_or(AttendanceError::NotFound("attendance record"))
    }
}
