use axum::{extract::State, Json};

use crate::{
    auth::credential_store::Credential, db_core::prelude::*, error::AppJsonResult,
    model::reply_record::ReplyRecordCtrl,
};

/// # GET /replies
///
/// Drafted replies for the caller's mailbox, oldest first.
pub async fn get_all(
    credential: Credential,
    State(conn): State<DatabaseConnection>,
) -> AppJsonResult<Vec<reply_record::Model>> {
    let replies = ReplyRecordCtrl::get_by_owner_email(&conn, &credential.email_address).await?;

    Ok(Json(replies))
}
