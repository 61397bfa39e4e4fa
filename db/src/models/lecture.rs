use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A scheduled meeting instance of a course section.
///
/// Owned by its section (which lives outside this service); `section_id` and
/// `teacher_id` are back-references without FK constraints.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "lectures")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub section_id: i64,
    pub teacher_id: i64,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    /// Set only on the transition into `Ongoing`.
    pub actual_start: Option<DateTime<Utc>>,
    /// Set only on the transition into `Completed`.
    pub actual_end: Option<DateTime<Utc>>,
    pub room_number: Option<String>,
    pub status: LectureStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LectureStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "ongoing")]
    Ongoing,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::attendance_request::Entity")]
    AttendanceRequests,
    #[sea_orm(has_many = "super::attendance_record::Entity")]
    AttendanceRecords,
}

impl Related<super::attendance_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRequests.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::attendance_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AttendanceRecords.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Scheduled length of the lecture in whole minutes.
    pub fn scheduled_duration_minutes(&self) -> i64 {
        (self.scheduled_end - self.scheduled_start).num_minutes()
    }

    /// The boundary an unmatched trailing ENTRY closes against: `actual_end`
    /// once completed, otherwise "now" while still ongoing.
    pub fn presence_boundary(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.status {
            LectureStatus::Completed => self.actual_end,
            LectureStatus::Ongoing => Some(now),
            _ => None,
        }
    }
}
