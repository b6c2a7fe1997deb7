//! Monitored account model.

use crate::models::NormalizedReading;
use crate::services::scheduler::PollScheduler;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Which of the (at most two) monitored accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccountId {
    /// Account 1, always configured
    Primary,
    /// Account 2, present iff its credentials are valid
    Secondary,
}

impl AccountId {
    /// Suffix appended to persisted keys.
    pub fn key_suffix(self) -> &'static str {
        match self {
            AccountId::Primary => "",
            AccountId::Secondary => "_2",
        }
    }

    /// Persisted key for this account.
    pub fn key(self, base: &str) -> String {
        format!("{}{}", base, self.key_suffix())
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountId::Primary => write!(f, "account1"),
            AccountId::Secondary => write!(f, "account2"),
        }
    }
}

/// Share login for one account.
#[derive(Clone, PartialEq, Eq, Validate)]
pub struct Credentials {
    pub account_label: String,
    #[validate(length(min = 4))]
    pub username: String,
    #[validate(length(min = 4))]
    pub password: String,
}

impl Credentials {
    pub fn new(
        account_label: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            account_label: account_label.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both username and password must be at least 4 characters.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_label", &self.account_label)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the poller tracks for one monitored account.
///
/// The session token lives in the `SessionStore`, keyed by `id`.
#[derive(Debug, Clone)]
pub struct AccountContext {
    pub id: AccountId,
    pub credentials: Option<Credentials>,
    pub schedule: PollScheduler,
    /// Last successfully reconciled reading
    pub reading: Option<NormalizedReading>,
    /// Last user-facing failure, cleared on success
    pub error: Option<String>,
}

impl AccountContext {
    pub fn new(id: AccountId, credentials: Option<Credentials>) -> Self {
        Self {
            id,
            credentials,
            schedule: PollScheduler::new(),
            reading: None,
            error: None,
        }
    }

    /// Credentials if present and valid.
    pub fn valid_credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref().filter(|c| c.is_valid())
    }

    pub fn label(&self) -> String {
        match &self.credentials {
            Some(c) if !c.account_label.is_empty() => c.account_label.clone(),
            _ => self.id.to_string(),
        }
    }
}
