use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "reply_record")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub owner_email: String,
    pub source_email_id: i32,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::email_record::Entity",
        from = "Column::SourceEmailId",
        to = "super::email_record::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    EmailRecord,
}

impl Related<super::email_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmailRecord.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
