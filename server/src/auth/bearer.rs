use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use http::request::Parts;

use crate::error::AppError;

use super::credential_store::{Credential, CredentialStore};

#[derive(Debug)]
pub(crate) enum AuthError {
    MissingCredentials,
    InvalidToken,
}

/// Resolves `Authorization: Bearer <token>` through the [`CredentialStore`].
/// Handlers taking a `Credential` never run for unauthenticated requests.
#[async_trait]
impl<S> FromRequestParts<S> for Credential
where
    CredentialStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingCredentials)?;

        let store = CredentialStore::from_ref(state);
        let credential = store.find(bearer.token()).ok_or_else(|| {
            tracing::warn!("Rejected request with unknown bearer token");
            AuthError::InvalidToken
        })?;

        Ok(credential)
    }
}
