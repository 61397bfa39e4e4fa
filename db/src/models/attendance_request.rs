use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A short-lived self-marking window opened by a teacher for one lecture.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub lecture_id: i64,
    pub teacher_id: i64,
    pub duration_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: WindowStatus,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum WindowStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::lecture::Entity",
        from = "Column::LectureId",
        to = "super::lecture::Column::Id"
    )]
    Lecture,
    #[sea_orm(has_many = "super::attendance_request_mark::Entity")]
    Marks,
}

impl Related<super::lecture::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lecture.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::attendance_request_mark::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Marks.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Expiry is evaluated lazily: the stored status is only trusted after
    /// this check. Monotonic — once true it can never become false, because
    /// `expires_at` never moves and `Expired`/`Closed` are terminal.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status != WindowStatus::Active || now > self.expires_at
    }
}
