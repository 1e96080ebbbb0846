use async_trait::async_trait;
use url::Url;

use crate::{auth::credential_store::Credential, error::AppResult};

use super::{FileMeta, Message, Thread};

#[derive(Debug, Clone)]
pub struct FileDownload {
    pub meta: FileMeta,
    pub content: Vec<u8>,
}

/// Operations the service needs from the email provider. The production
/// implementation is [`super::client::EmailClient`].
#[async_trait]
pub trait MailboxGateway: Send + Sync {
    /// URL of the provider's hosted sign-in flow for `email_address`.
    fn hosted_auth_url(&self, email_address: &str, success_url: &str) -> AppResult<Url>;

    /// Trades an authorization code for a mailbox credential.
    async fn exchange_code(&self, code: &str) -> AppResult<Credential>;

    /// Most recently updated threads, with their messages expanded.
    async fn list_recent_threads(&self, access_token: &str, limit: u32) -> AppResult<Vec<Thread>>;

    async fn get_message(&self, access_token: &str, message_id: &str) -> AppResult<Message>;

    async fn download_file(&self, access_token: &str, file_id: &str) -> AppResult<FileDownload>;
}
