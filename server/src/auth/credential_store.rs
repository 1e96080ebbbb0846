use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};

/// Provider access for one connected mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub account_id: String,
    pub access_token: String,
    pub email_address: String,
}

/// In-memory map from bearer token to [`Credential`].
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<HashMap<String, Credential>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, token: &str) -> Option<Credential> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(token)
            .cloned()
    }

    /// Creates or replaces the credential reachable through `token`.
    pub fn upsert(&self, token: impl Into<String>, credential: Credential) {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(token.into(), credential);
    }

    /// Stores a credential under its account id, which is the token handed back to the caller.
    pub fn store_for_account(&self, credential: Credential) -> String {
        let token = credential.account_id.clone();
        self.upsert(token.clone(), credential);
        token
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
