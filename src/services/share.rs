// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Share API client.
//!
//! Handles:
//! - Publisher login (session id exchange)
//! - Latest glucose values for a session
//! - Session-expiry detection on 500 responses
//! - Connectivity probing before authenticated calls

use crate::config::Config;
use crate::error::ShareError;
use crate::models::RawSample;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Fixed application id the Share service expects from its mobile client.
pub const APPLICATION_ID: &str = "d89443d2-327c-4a6f-89e5-496bbb0317db";

/// Legacy client User-Agent sent on login.
pub const USER_AGENT: &str = "Dexcom Share/3.0.2.11 CFNetwork/711.2.23 Darwin/14.0.0";

/// Session id the service returns instead of an error for bad credentials.
pub const NULL_SESSION_ID: &str = "00000000-0000-0000-0000-000000000000";

/// History window requested per poll (24h).
pub const HISTORY_MINUTES: u32 = 1440;

/// Samples requested per poll.
pub const MAX_SAMPLE_COUNT: u32 = 4;

const LOGIN_PATH: &str = "/ShareWebServices/Services/General/LoginPublisherAccountByName";
const READINGS_PATH: &str = "/ShareWebServices/Services/Publisher/ReadPublisherLatestGlucoseValues";

/// Error codes in a 500 body that mean the session is no longer valid.
const SESSION_INVALID_CODES: [&str; 2] = ["SessionNotValid", "SessionIdNotFound"];

/// Upstream operations the core depends on.
///
/// Implemented over HTTP by [`ShareClient`]; tests substitute scripted fakes.
pub trait ShareApi: Send + Sync {
    /// Exchange credentials for a session id (may be [`NULL_SESSION_ID`]).
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<String, ShareError>> + Send;

    /// Latest samples for a session. Session rejection maps to
    /// [`ShareError::SessionExpiredRetry`].
    fn read_latest_glucose(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Vec<RawSample>, ShareError>> + Send;

    /// Best-effort reachability check; never authoritative.
    fn is_online(&self) -> impl Future<Output = bool> + Send;
}

/// Login request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    account_name: &'a str,
    password: &'a str,
    application_id: &'a str,
}

/// Error body returned with HTTP 500.
#[derive(Debug, Deserialize)]
struct ShareErrorBody {
    #[serde(rename = "Code")]
    code: Option<String>,
}

/// HTTP client for the Share service.
#[derive(Clone)]
pub struct ShareClient {
    http: reqwest::Client,
    base_url: String,
    probe_url: String,
}

impl ShareClient {
    /// Create a client with the configured origin, probe and timeout.
    pub fn new(config: &Config) -> Result<Self, ShareError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ShareError::Internal(anyhow::anyhow!("Failed building HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.share_base_url.trim_end_matches('/').to_string(),
            probe_url: config.connectivity_probe_url.clone(),
        })
    }

    fn readings_url(&self, session_id: &str) -> String {
        format!(
            "{}{}?sessionId={}&minutes={}&maxCount={}",
            self.base_url,
            READINGS_PATH,
            urlencoding::encode(session_id),
            HISTORY_MINUTES,
            MAX_SAMPLE_COUNT
        )
    }

    /// Map a failed readings response to a soft or hard error.
    async fn check_readings_failure(response: reqwest::Response) -> ShareError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.as_u16() == 500 {
            if let Ok(ShareErrorBody { code: Some(code) }) = serde_json::from_str(&body) {
                if SESSION_INVALID_CODES.contains(&code.as_str()) {
                    tracing::debug!(code = %code, "Share session rejected");
                    return ShareError::SessionExpiredRetry;
                }
            }
        }

        tracing::warn!(status = %status, body = %body, "Share readings request failed");
        ShareError::UpstreamRequestFailed(status.as_u16())
    }
}

impl ShareApi for ShareClient {
    async fn login(&self, username: &str, password: &str) -> Result<String, ShareError> {
        let body = LoginRequest {
            account_name: username,
            password,
            application_id: APPLICATION_ID,
        };

        let response = self
            .http
            .post(format!("{}{}", self.base_url, LOGIN_PATH))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ShareError::Transport(format!("Login request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Share login failed");
            return Err(ShareError::AuthRequestFailed(status.as_u16()));
        }

        response
            .json::<String>()
            .await
            .map_err(|e| ShareError::MalformedResponse(format!("Failed to parse session id: {}", e)))
    }

    async fn read_latest_glucose(&self, session_id: &str) -> Result<Vec<RawSample>, ShareError> {
        let response = self
            .http
            .post(self.readings_url(session_id))
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_LENGTH, "0")
            .send()
            .await
            .map_err(|e| ShareError::Transport(format!("Readings request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::check_readings_failure(response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ShareError::MalformedResponse(format!("Unexpected readings body: {}", e)))
    }

    async fn is_online(&self) -> bool {
        match self.http.get(&self.probe_url).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Connectivity probe failed");
                false
            }
        }
    }
}
