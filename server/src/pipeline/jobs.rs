use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::credential_store::Credential, db_core::prelude::*, error::AppResult, Completion,
};

use super::replies::{generate_replies, ReplyBatchReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// One reply-generation run, pollable by the account that started it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyJob {
    pub job_id: Uuid,
    #[serde(skip)]
    pub account_id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReplyBatchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReplyJobs {
    inner: Arc<RwLock<HashMap<Uuid, ReplyJob>>>,
}

impl ReplyJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, account_id: &str) -> ReplyJob {
        let job = ReplyJob {
            job_id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            status: JobStatus::Running,
            created_at: Utc::now(),
            finished_at: None,
            report: None,
            error: None,
        };
        self.write().insert(job.job_id, job.clone());
        job
    }

    /// Looks a job up on behalf of `account_id`; jobs of other accounts are invisible.
    pub fn get(&self, job_id: Uuid, account_id: &str) -> Option<ReplyJob> {
        self.read()
            .get(&job_id)
            .filter(|job| job.account_id == account_id)
            .cloned()
    }

    pub fn finish(&self, job_id: Uuid, result: AppResult<ReplyBatchReport>) -> Option<ReplyJob> {
        let mut jobs = self.write();
        let job = jobs.get_mut(&job_id)?;
        job.finished_at = Some(Utc::now());
        match result {
            Ok(report) => {
                job.status = JobStatus::Completed;
                job.report = Some(report);
            }
            Err(e) => {
                job.status = JobStatus::Failed;
                job.error = Some(e.to_string());
            }
        }
        Some(job.clone())
    }

    /// Drops jobs that finished more than `finished_max_age` ago and jobs
    /// still running after `running_max_age`.
    pub fn clean_expired(&self, finished_max_age: Duration, running_max_age: Duration) {
        let now = Utc::now();
        self.write().retain(|job_id, job| match job.finished_at {
            Some(finished) => finished > now - finished_max_age,
            None if job.created_at > now - running_max_age => true,
            None => {
                tracing::warn!("Dropping reply job {} stuck in running state", job_id);
                false
            }
        });
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Uuid, ReplyJob>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Uuid, ReplyJob>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Runs the generation for an already created job and records its outcome.
pub async fn run_reply_job(
    jobs: ReplyJobs,
    job_id: Uuid,
    conn: DatabaseConnection,
    completion: Completion,
    credential: Credential,
) -> Option<ReplyJob> {
    tracing::info!("Reply job {} started for {}", job_id, credential.email_address);
    let result = generate_replies(&conn, completion.as_ref(), &credential).await;
    if let Err(e) = &result {
        tracing::error!("Reply job {} failed: {}", job_id, e);
    }

    let job = jobs.finish(job_id, result);
    if let Some(job) = &job {
        tracing::info!("Reply job {} finished with status {:?}", job_id, job.status);
    }
    job
}
