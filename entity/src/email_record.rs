use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One ingested thread summary. `(account_id, subject, snippet)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "email_record")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub account_id: String,
    pub own_email: String,
    pub from_email: String,
    #[sea_orm(column_type = "Text")]
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub snippet: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reply_record::Entity")]
    ReplyRecord,
}

impl Related<super::reply_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReplyRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
