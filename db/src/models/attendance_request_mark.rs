use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One student's membership in a window's marked set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "attendance_request_marks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub request_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub student_id: i64,
    pub marked_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::attendance_request::Entity",
        from = "Column::RequestId",
        to = "super::attendance_request::Column::Id"
    )]
    Request,
}

impl Related<super::attendance_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}
