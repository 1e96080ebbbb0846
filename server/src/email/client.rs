use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{
    auth::credential_store::Credential,
    error::{AppError, AppResult},
    server_config::ProviderConfig,
    util::ensure_success,
    HttpClient,
};

use super::{FileDownload, FileMeta, MailboxGateway, Message, Thread};

macro_rules! provider_url {
    ($base:expr, $($segments:expr),*) => {
        join_segments(&$base, &[$($segments),*])
    };
}

/// Appends each segment to the API base path, percent-encoding it so a
/// caller-supplied id cannot change the path or the query.
fn join_segments(base: &Url, segments: &[&str]) -> AppResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("Provider API URI {} cannot take a path", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
    account_id: String,
    email_address: String,
}

/// reqwest client for the hosted email provider API.
#[derive(Debug, Clone)]
pub struct EmailClient {
    http_client: HttpClient,
    api_uri: Url,
    client_id: String,
    client_secret: String,
    scopes: Vec<String>,
    frontend_url: Url,
}

impl EmailClient {
    pub fn new(http_client: HttpClient, provider: &ProviderConfig, frontend_url: Url) -> Self {
        EmailClient {
            http_client,
            api_uri: provider.api_uri.clone(),
            client_id: provider.client_id.clone(),
            client_secret: provider.client_secret.clone(),
            scopes: provider.scopes.clone(),
            frontend_url,
        }
    }

    async fn get_file_meta(&self, access_token: &str, file_id: &str) -> AppResult<FileMeta> {
        let resp = self
            .http_client
            .get(provider_url!(self.api_uri, "files", file_id)?)
            .bearer_auth(access_token)
            .send()
            .await?;

        let meta = ensure_success(resp, "File lookup")
            .await?
            .json::<FileMeta>()
            .await?;

        Ok(meta)
    }
}

#[async_trait]
impl MailboxGateway for EmailClient {
    fn hosted_auth_url(&self, email_address: &str, success_url: &str) -> AppResult<Url> {
        let redirect_uri = self
            .frontend_url
            .join(success_url)
            .map_err(|e| AppError::BadRequest(format!("Invalid success_url: {}", e)))?;

        let mut url = provider_url!(self.api_uri, "oauth", "authorize")?;
        url.query_pairs_mut().extend_pairs(&[
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("scopes", self.scopes.join(",").as_str()),
            ("login_hint", email_address),
            ("redirect_uri", redirect_uri.as_str()),
        ]);

        Ok(url)
    }

    async fn exchange_code(&self, code: &str) -> AppResult<Credential> {
        let resp = self
            .http_client
            .post(provider_url!(self.api_uri, "oauth", "token")?)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
            ])
            .send()
            .await?;

        let token = ensure_success(resp, "Token exchange")
            .await?
            .json::<TokenExchangeResponse>()
            .await?;

        tracing::info!(
            "Exchanged authorization code for account {}",
            token.account_id
        );

        Ok(Credential {
            account_id: token.account_id,
            access_token: token.access_token,
            email_address: token.email_address,
        })
    }

    async fn list_recent_threads(&self, access_token: &str, limit: u32) -> AppResult<Vec<Thread>> {
        let resp = self
            .http_client
            .get(provider_url!(self.api_uri, "threads")?)
            .query(&[("limit", limit.to_string().as_str()), ("view", "expanded")])
            .bearer_auth(access_token)
            .send()
            .await?;

        let threads = ensure_success(resp, "Thread listing")
            .await?
            .json::<Vec<Thread>>()
            .await?;

        Ok(threads)
    }

    async fn get_message(&self, access_token: &str, message_id: &str) -> AppResult<Message> {
        let resp = self
            .http_client
            .get(provider_url!(self.api_uri, "messages", message_id)?)
            .bearer_auth(access_token)
            .send()
            .await?;

        let message = ensure_success(resp, "Message")
            .await?
            .json::<Message>()
            .await?;

        Ok(message)
    }

    async fn download_file(&self, access_token: &str, file_id: &str) -> AppResult<FileDownload> {
        let meta = self.get_file_meta(access_token, file_id).await?;

        let resp = self
            .http_client
            .get(provider_url!(self.api_uri, "files", file_id, "download")?)
            .bearer_auth(access_token)
            .send()
            .await?;

        let content = ensure_success(resp, "File download")
            .await?
            .bytes()
            .await?
            .to_vec();

        Ok(FileDownload { meta, content })
    }
}
