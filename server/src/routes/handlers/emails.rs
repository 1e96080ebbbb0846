use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::credential_store::Credential,
    email::{Message, Thread},
    error::{AppError, AppJsonResult, AppResult},
    pipeline::{ingest_recent_threads, run_reply_job, ReplyJob},
    ServerState,
};

/// # GET /emails/ingest
///
/// Archives the most recent threads and returns all of them, archived or not.
pub async fn ingest(
    credential: Credential,
    State(state): State<ServerState>,
) -> AppResult<(StatusCode, Json<Vec<Thread>>)> {
    let report = ingest_recent_threads(
        &state.conn,
        state.mailbox.as_ref(),
        &credential,
        state.settings.thread_limit,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(report.threads)))
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    fn required_id(&self) -> AppResult<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("Query parameter `id` is required".to_string()))
    }
}

/// # GET /emails/message?id=
pub async fn get_message(
    credential: Credential,
    State(state): State<ServerState>,
    Query(query): Query<IdQuery>,
) -> AppJsonResult<Message> {
    let message = state
        .mailbox
        .get_message(&credential.access_token, query.required_id()?)
        .await?;

    Ok(Json(message))
}

/// # GET /emails/file?id=
///
/// Streams back the raw attachment with its content type.
pub async fn get_file(
    credential: Credential,
    State(state): State<ServerState>,
    Query(query): Query<IdQuery>,
) -> AppResult<(HeaderMap, Vec<u8>)> {
    let file = state
        .mailbox
        .download_file(&credential.access_token, query.required_id()?)
        .await?;

    let mut headers = HeaderMap::new();
    let content_type = file
        .meta
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    headers.insert(header::CONTENT_TYPE, content_type);

    if let Some(disposition) = file
        .meta
        .filename
        .as_deref()
        .map(|name| name.replace('"', ""))
        .and_then(|name| HeaderValue::from_str(&format!("attachment; filename=\"{}\"", name)).ok())
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    Ok((headers, file.content))
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRepliesQuery {
    #[serde(default)]
    pub wait: bool,
}

/// # GET /emails/generate-replies
///
/// Starts a reply-generation job and returns its handle with 202.
/// With `?wait=true` the request waits for every draft and returns the finished job with 200.
pub async fn generate_replies(
    credential: Credential,
    State(state): State<ServerState>,
    Query(query): Query<GenerateRepliesQuery>,
) -> AppResult<(StatusCode, Json<ReplyJob>)> {
    let job = state.reply_jobs.create(&credential.account_id);
    let run = run_reply_job(
        state.reply_jobs.clone(),
        job.job_id,
        state.conn.clone(),
        state.completion.clone(),
        credential,
    );

    // detached: dropping the request leaves the job running
    let handle = tokio::spawn(run);

    if query.wait {
        let finished = handle
            .await
            .map_err(|e| anyhow::anyhow!("Reply job {} aborted: {}", job.job_id, e))?
            .ok_or_else(|| anyhow::anyhow!("Reply job {} disappeared", job.job_id))?;
        return Ok((StatusCode::OK, Json(finished)));
    }

    Ok((StatusCode::ACCEPTED, Json(job)))
}

/// # GET /emails/generate-replies/:job_id
pub async fn get_reply_job(
    credential: Credential,
    State(state): State<ServerState>,
    Path(job_id): Path<Uuid>,
) -> AppJsonResult<ReplyJob> {
    let job = state
        .reply_jobs
        .get(job_id, &credential.account_id)
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;

    Ok(Json(job))
}
