// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! cgm-glance: an always-on glucose display fed by the Share follower service
//!
//! This crate polls the upstream service for one or two monitored accounts,
//! reconciles noisy multi-device sample batches, and schedules the next poll
//! from the sensor's own cadence.

pub mod config;
pub mod db;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use db::KeyValueStore;
use display::DisplaySnapshot;
use models::{AccountContext, AccountId, Credentials};
use services::{
    AccountPoller, AuthClient, CredentialStore, PollOutcome, ReadingClient, SessionStore,
    SettingsStore, ShareApi,
};
use std::sync::Arc;

/// All monitored accounts and the services that poll them.
///
/// Accounts are polled one after another within a tick; each owns its
/// context, so one account's failure never touches the other's state.
pub struct Dashboard<A> {
    poller: AccountPoller<A>,
    credentials: CredentialStore,
    settings: SettingsStore,
    accounts: Vec<AccountContext>,
}

impl<A: ShareApi> Dashboard<A> {
    /// Build the dashboard from persisted state. Account 1 is always present;
    /// account 2 only when its stored credentials are valid.
    pub fn new(api: Arc<A>, store: Arc<dyn KeyValueStore>) -> Self {
        let sessions = SessionStore::new(store.clone());
        let auth = AuthClient::new(api, sessions);
        let poller = AccountPoller::new(ReadingClient::new(auth));
        let credentials = CredentialStore::new(store.clone());
        let settings = SettingsStore::new(store);

        let mut accounts = vec![AccountContext::new(
            AccountId::Primary,
            credentials.load(AccountId::Primary),
        )];
        if let Some(secondary) = credentials
            .load(AccountId::Secondary)
            .filter(Credentials::is_valid)
        {
            accounts.push(AccountContext::new(AccountId::Secondary, Some(secondary)));
        }

        tracing::info!(accounts = accounts.len(), "Dashboard initialized");

        Self {
            poller,
            credentials,
            settings,
            accounts,
        }
    }

    pub fn accounts(&self) -> &[AccountContext] {
        &self.accounts
    }

    pub fn account(&self, id: AccountId) -> Option<&AccountContext> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn poller(&self) -> &AccountPoller<A> {
        &self.poller
    }

    /// Run one poll step per account, in order.
    pub async fn tick(&mut self, now_ms: i64) -> Vec<(AccountId, PollOutcome)> {
        let mut outcomes = Vec::with_capacity(self.accounts.len());
        for ctx in self.accounts.iter_mut() {
            let outcome = self.poller.poll(ctx, now_ms).await;
            outcomes.push((ctx.id, outcome));
        }
        outcomes
    }

    /// Display values for every account as of `now_ms`.
    pub fn snapshots(&self, now_ms: i64, local_hour: u32) -> Vec<DisplaySnapshot> {
        let opacity = self.settings.current_opacity(local_hour);
        self.accounts
            .iter()
            .map(|ctx| {
                DisplaySnapshot::from_context(ctx, now_ms)
                    .with_color(self.settings.account_color(ctx.id))
                    .with_opacity(opacity)
            })
            .collect()
    }

    /// Save edited credentials.
    ///
    /// A changed login drops the session and last reading and makes the
    /// account due immediately. Account 2 is added or removed as its
    /// credentials become valid or invalid.
    pub fn update_credentials(&mut self, id: AccountId, credentials: Credentials) {
        let changed = self.credentials.save(id, &credentials);
        if changed {
            tracing::info!(account = %id, "Credentials changed, invalidating session");
            self.poller.readings().auth().invalidate(id);
        }

        let valid = credentials.is_valid();
        match self.accounts.iter().position(|a| a.id == id) {
            Some(index) if id == AccountId::Secondary && !valid => {
                self.accounts.remove(index);
            }
            Some(index) => {
                let ctx = &mut self.accounts[index];
                ctx.credentials = Some(credentials);
                if changed {
                    ctx.schedule.reset();
                    ctx.reading = None;
                    ctx.error = None;
                }
            }
            None if valid => {
                self.accounts
                    .push(AccountContext::new(id, Some(credentials)));
                self.accounts.sort_by_key(|a| a.id);
            }
            None => {}
        }
    }

    /// Forget an account's credentials and session.
    pub fn clear_credentials(&mut self, id: AccountId) {
        self.credentials.clear(id);
        self.poller.readings().auth().invalidate(id);
        match id {
            AccountId::Primary => {
                if let Some(ctx) = self.accounts.iter_mut().find(|a| a.id == id) {
                    *ctx = AccountContext::new(id, None);
                }
            }
            AccountId::Secondary => self.accounts.retain(|a| a.id != id),
        }
    }
}
