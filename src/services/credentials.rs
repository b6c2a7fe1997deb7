// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential source backed by the key-value store.
//!
//! Username and password are base64-obscured so they are not stored as
//! plain text at a glance. This is not encryption; the state file must be
//! treated as containing the credentials.

use crate::db::{keys, KeyValueStore};
use crate::models::{AccountId, Credentials};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::Arc;

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load stored credentials. Returns `None` if either field is missing or undecodable.
    pub fn load(&self, account: AccountId) -> Option<Credentials> {
        let username = self.load_obscured(&account.key(keys::USERNAME))?;
        let password = self.load_obscured(&account.key(keys::PASSWORD))?;
        let label = self
            .store
            .get(&account.key(keys::LABEL))
            .unwrap_or_default();

        Some(Credentials::new(label, username, password))
    }

    /// Save credentials. Returns `true` if the stored login changed.
    pub fn save(&self, account: AccountId, credentials: &Credentials) -> bool {
        let changed = self
            .load(account)
            .map(|existing| {
                existing.username != credentials.username
                    || existing.password != credentials.password
            })
            .unwrap_or(true);

        self.store.set(
            &account.key(keys::USERNAME),
            &BASE64.encode(&credentials.username),
        );
        self.store.set(
            &account.key(keys::PASSWORD),
            &BASE64.encode(&credentials.password),
        );
        if credentials.account_label.is_empty() {
            self.store.remove(&account.key(keys::LABEL));
        } else {
            self.store
                .set(&account.key(keys::LABEL), &credentials.account_label);
        }

        changed
    }

    pub fn clear(&self, account: AccountId) {
        for base in [keys::USERNAME, keys::PASSWORD, keys::LABEL] {
            self.store.remove(&account.key(base));
        }
    }

    fn load_obscured(&self, key: &str) -> Option<String> {
        let encoded = self.store.get(key)?;
        let bytes = match BASE64.decode(encoded.trim()) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored credential is not valid base64");
                return None;
            }
        };
        String::from_utf8(bytes).ok()
    }
}
