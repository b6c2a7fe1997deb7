//! Per-account session tokens, persisted so a restart reuses the session.

use crate::db::{keys, KeyValueStore};
use crate::models::AccountId;
use crate::services::share::NULL_SESSION_ID;
use std::sync::Arc;

/// A session id issued to one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub value: String,
    pub account: AccountId,
}

impl SessionToken {
    /// The all-zero session id signals bad credentials and is never a usable token.
    pub fn is_null(value: &str) -> bool {
        value.trim() == NULL_SESSION_ID || value.trim().is_empty()
    }
}

/// Holds the current session token per account.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, account: AccountId) -> Option<SessionToken> {
        self.store
            .get(&account.key(keys::TOKEN))
            .filter(|value| !SessionToken::is_null(value))
            .map(|value| SessionToken { value, account })
    }

    /// Store a token. A null session id is refused.
    pub fn set(&self, account: AccountId, token: &str) {
        if SessionToken::is_null(token) {
            tracing::warn!(account = %account, "Refusing to store null session id");
            return;
        }
        self.store.set(&account.key(keys::TOKEN), token);
    }

    pub fn invalidate(&self, account: AccountId) {
        self.store.remove(&account.key(keys::TOKEN));
    }
}
