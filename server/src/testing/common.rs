use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use http::Response;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use url::Url;

use crate::{
    auth::credential_store::{Credential, CredentialStore},
    db_core::migrate,
    email::{thread::Participant, FileDownload, FileMeta, MailboxGateway, Message, Thread},
    error::{AppError, AppResult},
    pipeline::ReplyJobs,
    prompt::CompletionEngine,
    PipelineSettings, ServerState,
};

/// Fresh in-memory SQLite database with the schema applied.
pub async fn setup_db() -> DatabaseConnection {
    let mut db_options = ConnectOptions::new("sqlite::memory:");
    // every pooled connection would otherwise open its own empty database
    db_options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let conn = Database::connect(db_options)
        .await
        .expect("in-memory database should open");
    migrate::run(&conn).await.expect("schema should apply");
    conn
}

pub fn credential(account_id: &str, email_address: &str) -> Credential {
    Credential {
        account_id: account_id.to_string(),
        access_token: format!("access-{}", account_id),
        email_address: email_address.to_string(),
    }
}

pub fn thread(id: &str, subject: &str, snippet: &str) -> Thread {
    Thread {
        id: id.to_string(),
        subject: Some(subject.to_string()),
        snippet: Some(snippet.to_string()),
        participants: vec![Participant {
            name: Some("Sender".to_string()),
            email: "sender@x.com".to_string(),
        }],
        ..Default::default()
    }
}

/// Mailbox gateway serving a fixed set of threads, messages and files.
#[derive(Default)]
pub struct FakeMailbox {
    threads: Mutex<Vec<Thread>>,
    messages: Vec<Message>,
    files: Vec<FileDownload>,
    exchanged: Option<Credential>,
    fail: bool,
    last_limit: Mutex<Option<u32>>,
}

impl FakeMailbox {
    pub fn with_threads(threads: Vec<Thread>) -> Self {
        Self {
            threads: Mutex::new(threads),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_file(mut self, meta: FileMeta, content: &[u8]) -> Self {
        self.files.push(FileDownload {
            meta,
            content: content.to_vec(),
        });
        self
    }

    pub fn exchanging_to(mut self, credential: Credential) -> Self {
        self.exchanged = Some(credential);
        self
    }

    pub fn set_threads(&self, threads: Vec<Thread>) {
        *self.threads.lock().unwrap() = threads;
    }

    pub fn last_limit(&self) -> Option<u32> {
        *self.last_limit.lock().unwrap()
    }

    fn check(&self) -> AppResult<()> {
        if self.fail {
            return Err(AppError::ExternalService("mailbox unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MailboxGateway for FakeMailbox {
    fn hosted_auth_url(&self, email_address: &str, success_url: &str) -> AppResult<Url> {
        let mut url = Url::parse("https://provider.test/oauth/authorize").unwrap();
        url.query_pairs_mut()
            .append_pair("login_hint", email_address)
            .append_pair("redirect_uri", success_url);
        Ok(url)
    }

    async fn exchange_code(&self, _code: &str) -> AppResult<Credential> {
        self.check()?;
        self.exchanged
            .clone()
            .ok_or_else(|| AppError::BadRequest("invalid code".to_string()))
    }

    async fn list_recent_threads(&self, _access_token: &str, limit: u32) -> AppResult<Vec<Thread>> {
        self.check()?;
        *self.last_limit.lock().unwrap() = Some(limit);
        Ok(self.threads.lock().unwrap().clone())
    }

    async fn get_message(&self, _access_token: &str, message_id: &str) -> AppResult<Message> {
        self.check()?;
        self.messages
            .iter()
            .find(|m| m.id == message_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Message not found".to_string()))
    }

    async fn download_file(&self, _access_token: &str, file_id: &str) -> AppResult<FileDownload> {
        self.check()?;
        self.files
            .iter()
            .find(|f| f.meta.id == file_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }
}

/// Completion engine answering every prompt with the same text.
pub struct FakeCompletion {
    reply: String,
    fail_on: Option<String>,
    delay: Option<Duration>,
    prompts: Mutex<Vec<String>>,
}

impl FakeCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_on: None,
            delay: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Fails prompts containing `needle`.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    /// Sleeps for `delay` before answering.
    pub fn slowed_by(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionEngine for FakeCompletion {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_on {
            Some(needle) if prompt.contains(needle.as_str()) => Err(AppError::ExternalService(
                "completion unavailable".to_string(),
            )),
            _ => Ok(self.reply.clone()),
        }
    }
}

pub fn test_state(
    conn: DatabaseConnection,
    mailbox: Arc<FakeMailbox>,
    completion: Arc<FakeCompletion>,
) -> ServerState {
    ServerState {
        conn,
        credentials: CredentialStore::new(),
        mailbox,
        completion,
        reply_jobs: ReplyJobs::new(),
        settings: PipelineSettings { thread_limit: 5 },
    }
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
