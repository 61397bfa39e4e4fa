use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The authoritative attendance outcome for one (lecture, student) pair.
///
/// The composite primary key is the uniqueness ground truth: there is never a
/// second row for the same pair, and concurrent markers resolve on it.
/// Holds back-references to the lecture and student without ownership — no
/// cascade deletes in either direction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub lecture_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i64,
    pub marked_at: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub cumulative_duration_minutes: i32,
    pub entry_exit_count: i32,
    pub last_entry_time: Option<DateTime<Utc>>,
    pub verification_method: VerificationMethod,
    pub confidence_score: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "late")]
    Late,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum VerificationMethod {
    #[sea_orm(string_value = "face")]
    Face,
    #[sea_orm(string_value = "voice")]
    Voice,
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "gps")]
    Gps,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lecture::Entity",
        from = "Column::LectureId",
        to = "super::lecture::Column::Id"
    )]
    Lecture,
}

impl Related<super::lecture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lecture.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}
