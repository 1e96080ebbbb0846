use futures::future::join_all;
use serde::Serialize;

use crate::{
    auth::credential_store::Credential,
    db_core::prelude::*,
    error::AppResult,
    model::{email_record::EmailRecordCtrl, reply_record::ReplyRecordCtrl},
    prompt::{reply_prompt::reply_prompt, CompletionEngine},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReplyItemStatus {
    Succeeded {
        #[serde(rename = "replyId")]
        reply_id: i32,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyItemReport {
    pub email_id: i32,
    #[serde(flatten)]
    pub status: ReplyItemStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplyBatchReport {
    pub items: Vec<ReplyItemReport>,
}

impl ReplyBatchReport {
    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.status, ReplyItemStatus::Succeeded { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

/// Drafts one reply per archived email owned by `credential` and stores each draft.
///
/// Emails are processed concurrently; a failed completion or write is reported
/// on its own item and does not affect the others.
pub async fn generate_replies(
    conn: &DatabaseConnection,
    completion: &dyn CompletionEngine,
    credential: &Credential,
) -> AppResult<ReplyBatchReport> {
    let owner_email = credential.email_address.as_str();
    let emails = EmailRecordCtrl::get_by_owner_email(conn, owner_email).await?;

    let items = join_all(
        emails
            .iter()
            .map(|email| draft_reply(conn, completion, owner_email, email)),
    )
    .await;

    let report = ReplyBatchReport { items };
    tracing::info!(
        "Generated replies for {}: {} succeeded, {} failed",
        owner_email,
        report.succeeded(),
        report.failed()
    );

    Ok(report)
}

async fn draft_reply(
    conn: &DatabaseConnection,
    completion: &dyn CompletionEngine,
    owner_email: &str,
    email: &email_record::Model,
) -> ReplyItemReport {
    let result = async {
        let body = completion
            .complete(&reply_prompt(&email.subject, &email.snippet))
            .await?;
        ReplyRecordCtrl::insert(conn, owner_email, email.id, body).await
    }
    .await;

    let status = match result {
        Ok(reply) => ReplyItemStatus::Succeeded { reply_id: reply.id },
        Err(e) => {
            tracing::error!("Failed to draft a reply for email {}: {}", email.id, e);
            ReplyItemStatus::Failed {
                error: e.to_string(),
            }
        }
    };

    ReplyItemReport {
        email_id: email.id,
        status,
    }
}
