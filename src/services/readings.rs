//! Fetching the latest sample batch for an account.

use crate::error::{Result, ShareError};
use crate::models::{AccountId, Credentials, RawSample};
use crate::services::auth::AuthClient;
use crate::services::share::ShareApi;

pub struct ReadingClient<A> {
    auth: AuthClient<A>,
}

impl<A> Clone for ReadingClient<A> {
    fn clone(&self) -> Self {
        Self {
            auth: self.auth.clone(),
        }
    }
}

impl<A: ShareApi> ReadingClient<A> {
    pub fn new(auth: AuthClient<A>) -> Self {
        Self { auth }
    }

    pub fn auth(&self) -> &AuthClient<A> {
        &self.auth
    }

    /// Fetch up to four samples from the last 24 hours.
    ///
    /// A rejected session is invalidated and refreshed, then reported as
    /// [`ShareError::SessionExpiredRetry`] so the caller tries again next cycle.
    pub async fn fetch_recent_readings(
        &self,
        account: AccountId,
        credentials: &Credentials,
    ) -> Result<Vec<RawSample>> {
        if !self.auth.api().is_online().await {
            tracing::error!(account = %account, "Network unavailable, skipping fetch");
            return Err(ShareError::NetworkUnavailable);
        }

        // Login failures were already reported by the auth client.
        let token = self
            .auth
            .login_online(account, credentials, false)
            .await
            .map_err(|e| ShareError::NoSession(e.to_string()))?;

        tracing::debug!(account = %account, "Refreshing values from Share");

        match self.auth.api().read_latest_glucose(&token.value).await {
            Ok(batch) => {
                tracing::debug!(account = %account, samples = batch.len(), "Share readings received");
                Ok(batch)
            }
            Err(ShareError::SessionExpiredRetry) => {
                tracing::debug!(account = %account, "Session expired, forcing refresh");
                self.auth.invalidate(account);
                if let Err(e) = self.auth.login_online(account, credentials, true).await {
                    tracing::debug!(account = %account, error = %e, "Forced refresh did not succeed");
                }
                Err(ShareError::SessionExpiredRetry)
            }
            Err(e) => {
                tracing::error!(account = %account, error = %e, "Error fetching glucose values");
                Err(e)
            }
        }
    }
}
