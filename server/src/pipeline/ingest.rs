use futures::future::join_all;
use serde::Serialize;

use crate::{
    auth::credential_store::Credential,
    db_core::prelude::*,
    email::{MailboxGateway, Thread},
    error::AppResult,
    model::email_record::{EmailRecordCtrl, InsertOutcome, NewEmailRecord},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum IngestOutcome {
    Archived {
        #[serde(rename = "recordId")]
        record_id: i32,
    },
    AlreadyArchived,
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadIngestResult {
    pub thread_id: String,
    #[serde(flatten)]
    pub outcome: IngestOutcome,
}

/// Every fetched thread, plus what happened when archiving each one.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub threads: Vec<Thread>,
    pub results: Vec<ThreadIngestResult>,
}

impl IngestReport {
    fn count(&self, f: impl Fn(&IngestOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| f(&r.outcome)).count()
    }

    pub fn archived(&self) -> usize {
        self.count(|o| matches!(o, IngestOutcome::Archived { .. }))
    }

    pub fn already_archived(&self) -> usize {
        self.count(|o| matches!(o, IngestOutcome::AlreadyArchived))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, IngestOutcome::Failed { .. }))
    }
}

/// Fetches the latest threads for `credential` and archives one summary per thread.
///
/// Inserts run concurrently and are isolated from each other: a duplicate is
/// recorded as [`IngestOutcome::AlreadyArchived`], any other failure as
/// [`IngestOutcome::Failed`], and neither stops the remaining threads. Only a
/// failure to list the threads fails the whole call.
pub async fn ingest_recent_threads(
    conn: &DatabaseConnection,
    mailbox: &dyn MailboxGateway,
    credential: &Credential,
    limit: u32,
) -> AppResult<IngestReport> {
    let threads = mailbox
        .list_recent_threads(&credential.access_token, limit)
        .await?;

    let results = join_all(
        threads
            .iter()
            .map(|thread| archive_thread(conn, credential, thread)),
    )
    .await;

    let report = IngestReport { threads, results };
    tracing::info!(
        "Ingested {} threads for account {}: {} archived, {} already archived, {} failed",
        report.threads.len(),
        credential.account_id,
        report.archived(),
        report.already_archived(),
        report.failed()
    );

    Ok(report)
}

async fn archive_thread(
    conn: &DatabaseConnection,
    credential: &Credential,
    thread: &Thread,
) -> ThreadIngestResult {
    let record = NewEmailRecord {
        account_id: credential.account_id.clone(),
        own_email: credential.email_address.clone(),
        from_email: thread.sender_email(),
        subject: thread.subject_or_empty().to_string(),
        snippet: thread.snippet_or_empty().to_string(),
    };

    let outcome = match EmailRecordCtrl::insert(conn, record).await {
        Ok(InsertOutcome::Created(record_id)) => IngestOutcome::Archived { record_id },
        Ok(InsertOutcome::Conflict) => {
            tracing::info!(
                "Thread {} is already archived for account {}",
                thread.id,
                credential.account_id
            );
            IngestOutcome::AlreadyArchived
        }
        Err(e) => {
            tracing::error!("Failed to archive thread {}: {:?}", thread.id, e);
            IngestOutcome::Failed {
                error: e.to_string(),
            }
        }
    };

    ThreadIngestResult {
        thread_id: thread.id.clone(),
        outcome,
    }
}
