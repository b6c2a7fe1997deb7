// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session acquisition and refresh against the Share login endpoint.

use crate::error::{Result, ShareError};
use crate::models::{AccountId, Credentials};
use crate::services::session::{SessionStore, SessionToken};
use crate::services::share::ShareApi;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-account locks that serialize logins.
pub type RefreshLocks = Arc<DashMap<AccountId, Arc<Mutex<()>>>>;

/// Obtains and memoizes session tokens.
pub struct AuthClient<A> {
    api: Arc<A>,
    sessions: SessionStore,
    refresh_locks: RefreshLocks,
}

impl<A> Clone for AuthClient<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            sessions: self.sessions.clone(),
            refresh_locks: self.refresh_locks.clone(),
        }
    }
}

impl<A: ShareApi> AuthClient<A> {
    pub fn new(api: Arc<A>, sessions: SessionStore) -> Self {
        Self {
            api,
            sessions,
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    pub fn api(&self) -> &Arc<A> {
        &self.api
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Return a session token for the account, logging in if needed.
    ///
    /// 1. Probe connectivity (fail fast without touching Share)
    /// 2. Reuse the stored token unless `force_refresh`
    /// 3. Log in; a null session id means the credentials were rejected
    pub async fn login(
        &self,
        account: AccountId,
        credentials: &Credentials,
        force_refresh: bool,
    ) -> Result<SessionToken> {
        if !self.api.is_online().await {
            tracing::error!(account = %account, "Network unavailable, skipping login");
            return Err(ShareError::NetworkUnavailable);
        }

        self.login_online(account, credentials, force_refresh).await
    }

    /// [`login`](Self::login) for callers that have already probed connectivity.
    pub(crate) async fn login_online(
        &self,
        account: AccountId,
        credentials: &Credentials,
        force_refresh: bool,
    ) -> Result<SessionToken> {
        if !force_refresh {
            if let Some(token) = self.sessions.get(account) {
                return Ok(token);
            }
        }

        let lock = self
            .refresh_locks
            .entry(account)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another task may have logged in while we waited.
        if !force_refresh {
            if let Some(token) = self.sessions.get(account) {
                return Ok(token);
            }
        }

        tracing::info!(account = %account, force_refresh, "Refreshing Share session");

        let session_id = match self
            .api
            .login(&credentials.username, &credentials.password)
            .await
        {
            Ok(id) => id,
            Err(e @ ShareError::AuthRequestFailed(_)) => {
                self.sessions.invalidate(account);
                tracing::error!(account = %account, error = %e, "Share login rejected");
                return Err(e);
            }
            Err(e) => {
                tracing::error!(account = %account, error = %e, "Share login failed");
                return Err(e);
            }
        };

        if SessionToken::is_null(&session_id) {
            self.sessions.invalidate(account);
            tracing::error!(account = %account, "Share returned null session id, credentials invalid");
            return Err(ShareError::InvalidCredentials);
        }

        self.sessions.set(account, &session_id);
        tracing::info!(account = %account, "Share session updated");

        Ok(SessionToken {
            value: session_id,
            account,
        })
    }

    /// Drop the stored session (credentials edited or session rejected).
    pub fn invalidate(&self, account: AccountId) {
        self.sessions.invalidate(account);
    }
}
