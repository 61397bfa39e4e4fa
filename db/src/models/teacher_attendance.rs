use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// One PRESENT mark per (teacher, date) or (teacher, date, lecture).
/// The status is always PRESENT, so only the key and verification details are
/// stored; the unique index over the key is what the dedup relies on.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "teacher_attendance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub teacher_id: i64,
    pub date: NaiveDate,
    /// `None` scopes the mark to the whole day.
    pub lecture_id: Option<i64>,
    pub marked_at: DateTime<Utc>,
    pub verification_method: TeacherVerificationMethod,
    pub confidence: f64,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TeacherVerificationMethod {
    #[sea_orm(string_value = "face")]
    Face,
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "face_local")]
    FaceLocal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
