use sea_orm::ActiveModelTrait;

use crate::{db_core::prelude::*, error::AppResult};

pub struct ReplyRecordCtrl;

impl ReplyRecordCtrl {
    pub async fn insert(
        conn: &DatabaseConnection,
        owner_email: &str,
        source_email_id: i32,
        body: String,
    ) -> AppResult<reply_record::Model> {
        let active_model = reply_record::ActiveModel {
            id: ActiveValue::NotSet,
            owner_email: ActiveValue::Set(owner_email.to_string()),
            source_email_id: ActiveValue::Set(source_email_id),
            body: ActiveValue::Set(body),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        let reply = active_model.insert(conn).await?;

        Ok(reply)
    }

    /// Replies owned by `owner_email`, oldest first.
    pub async fn get_by_owner_email(
        conn: &DatabaseConnection,
        owner_email: &str,
    ) -> AppResult<Vec<reply_record::Model>> {
        let replies = ReplyRecord::find()
            .filter(reply_record::Column::OwnerEmail.eq(owner_email))
            .order_by_asc(reply_record::Column::Id)
            .all(conn)
            .await?;

        Ok(replies)
    }
}
