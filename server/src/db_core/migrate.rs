use sea_orm::{sea_query::Index, ConnectionTrait, Schema};

use super::prelude::*;

pub const EMAIL_RECORD_UNIQUE_INDEX: &str = "idx_email_record_account_subject_snippet";

/// Creates the archive tables and the email uniqueness index if they are missing.
/// The statements are generated from the entities so they run on Postgres and SQLite.
pub async fn run(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);

    let mut email_table = schema.create_table_from_entity(EmailRecord);
    email_table.if_not_exists();
    conn.execute(backend.build(&email_table)).await?;

    let mut reply_table = schema.create_table_from_entity(ReplyRecord);
    reply_table.if_not_exists();
    conn.execute(backend.build(&reply_table)).await?;

    let unique_index = Index::create()
        .name(EMAIL_RECORD_UNIQUE_INDEX)
        .table(EmailRecord)
        .col(email_record::Column::AccountId)
        .col(email_record::Column::Subject)
        .col(email_record::Column::Snippet)
        .unique()
        .if_not_exists()
        .to_owned();
    conn.execute(backend.build(&unique_index)).await?;

    tracing::info!("Database schema is up to date");
    Ok(())
}
