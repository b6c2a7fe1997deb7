// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error taxonomy for session, reading and polling failures.

/// Every way acquiring a reading can fail.
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("Network unavailable")]
    NetworkUnavailable,

    #[error("Login request failed with HTTP status {0}")]
    AuthRequestFailed(u16),

    #[error("Invalid Share credentials - check Settings")]
    InvalidCredentials,

    /// No session could be obtained; the login failure has already been reported.
    #[error("No session available: {0}")]
    NoSession(String),

    /// Upstream rejected the session; a refresh was triggered and the caller retries next cycle.
    #[error("Session expired, re-authenticating")]
    SessionExpiredRetry,

    #[error("Share request failed with HTTP status {0}")]
    UpstreamRequestFailed(u16),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing Share credentials - check Settings")]
    MissingCredentials,

    #[error("No prior sample far enough back for a delta")]
    NoPriorSample,

    #[error("No recent readings available")]
    NoReadings,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ShareError {
    /// Soft outcomes are expected steady-state behavior: retry next cycle, never shown as errors.
    pub fn is_soft(&self) -> bool {
        matches!(self, ShareError::SessionExpiredRetry | ShareError::NoSession(_))
    }

    /// Text for the account's error field, or `None` for soft outcomes.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ShareError::SessionExpiredRetry => None,
            // The underlying login failure is what the user needs to see.
            ShareError::NoSession(cause) => Some(cause.clone()),
            other => Some(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ShareError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ShareError::MalformedResponse(err.to_string())
        } else {
            ShareError::Transport(err.to_string())
        }
    }
}

/// Result type alias for Share operations
pub type Result<T> = std::result::Result<T, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_errors_are_not_user_facing() {
        assert!(ShareError::SessionExpiredRetry.is_soft());
        assert_eq!(ShareError::SessionExpiredRetry.user_message(), None);
        assert!(!ShareError::InvalidCredentials.is_soft());
    }

    #[test]
    fn no_session_surfaces_login_cause() {
        let err = ShareError::NoSession(ShareError::InvalidCredentials.to_string());
        assert!(err.is_soft());
        assert_eq!(
            err.user_message().as_deref(),
            Some("Invalid Share credentials - check Settings")
        );
    }

    #[test]
    fn hard_errors_carry_status() {
        let err = ShareError::UpstreamRequestFailed(503);
        assert_eq!(
            err.user_message().as_deref(),
            Some("Share request failed with HTTP status 503")
        );
    }
}
