use crate::{
    db_core::prelude::*,
    error::{is_unique_violation, AppResult},
};

pub struct EmailRecordCtrl;

/// Fields of an email summary about to be archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmailRecord {
    pub account_id: String,
    pub own_email: String,
    pub from_email: String,
    pub subject: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created(i32),
    /// A record with the same account, subject and snippet already exists.
    Conflict,
}

impl EmailRecordCtrl {
    pub async fn insert(
        conn: &DatabaseConnection,
        record: NewEmailRecord,
    ) -> Result<InsertOutcome, DbErr> {
        let active_model = email_record::ActiveModel {
            id: ActiveValue::NotSet,
            account_id: ActiveValue::Set(record.account_id),
            own_email: ActiveValue::Set(record.own_email),
            from_email: ActiveValue::Set(record.from_email),
            subject: ActiveValue::Set(record.subject),
            snippet: ActiveValue::Set(record.snippet),
            created_at: ActiveValue::Set(chrono::Utc::now().into()),
        };

        match EmailRecord::insert(active_model).exec(conn).await {
            Ok(result) => Ok(InsertOutcome::Created(result.last_insert_id)),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Conflict),
            Err(e) => Err(e),
        }
    }

    pub async fn get_by_owner_email(
        conn: &DatabaseConnection,
        own_email: &str,
    ) -> AppResult<Vec<email_record::Model>> {
        let records = EmailRecord::find()
            .filter(email_record::Column::OwnEmail.eq(own_email))
            .order_by_asc(email_record::Column::Id)
            .all(conn)
            .await?;

        Ok(records)
    }

    #[cfg(test)]
    pub async fn count_by_account(conn: &DatabaseConnection, account_id: &str) -> AppResult<u64> {
        use sea_orm::PaginatorTrait;

        let count = EmailRecord::find()
            .filter(email_record::Column::AccountId.eq(account_id))
            .count(conn)
            .await?;

        Ok(count)
    }
}
