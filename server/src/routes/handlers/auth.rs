use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    auth::credential_store::CredentialStore,
    error::{AppError, AppJsonResult, AppResult},
    Mailbox,
};

#[derive(Debug, Deserialize)]
pub struct GenerateUrlBody {
    pub email_address: String,
    pub success_url: String,
}

/// # POST /auth/generate-url
///
/// Returns the provider's hosted sign-in URL as plain text.
pub async fn handler_generate_url(
    State(mailbox): State<Mailbox>,
    Json(body): Json<GenerateUrlBody>,
) -> AppResult<String> {
    if body.email_address.trim().is_empty() {
        return Err(AppError::BadRequest("email_address is required".to_string()));
    }

    let url = mailbox.hosted_auth_url(body.email_address.trim(), &body.success_url)?;

    Ok(url.to_string())
}

#[derive(Debug, Deserialize)]
pub struct ExchangeTokenBody {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeTokenResponse {
    pub id: String,
    pub email_address: String,
}

/// # POST /auth/exchange-token
///
/// Trades an authorization code for a credential. The returned `id` is the
/// bearer token for every protected route.
pub async fn handler_exchange_token(
    State(mailbox): State<Mailbox>,
    State(credentials): State<CredentialStore>,
    Json(body): Json<ExchangeTokenBody>,
) -> AppJsonResult<ExchangeTokenResponse> {
    if body.token.is_empty() {
        return Err(AppError::BadRequest("token is required".to_string()));
    }

    let credential = mailbox.exchange_code(&body.token).await?;
    let email_address = credential.email_address.clone();
    let id = credentials.store_for_account(credential);

    tracing::info!(
        "Stored credential for {} ({} connected)",
        email_address,
        credentials.len()
    );

    Ok(Json(ExchangeTokenResponse { id, email_address }))
}
