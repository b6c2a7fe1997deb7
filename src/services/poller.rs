// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One poll step for one account: due check, fetch, reconcile, reschedule.

use crate::error::ShareError;
use crate::models::{AccountContext, NormalizedReading};
use crate::services::readings::ReadingClient;
use crate::services::reconcile;
use crate::services::share::ShareApi;
use crate::time_utils::format_millis_rfc3339;

/// Result of a poll step.
#[derive(Debug)]
pub enum PollOutcome {
    /// Not due, or a soft failure that retries next tick
    Skipped,
    Updated(NormalizedReading),
    Failed(ShareError),
}

impl PollOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, PollOutcome::Updated(_))
    }
}

pub struct AccountPoller<A> {
    readings: ReadingClient<A>,
}

impl<A> Clone for AccountPoller<A> {
    fn clone(&self) -> Self {
        Self {
            readings: self.readings.clone(),
        }
    }
}

impl<A: ShareApi> AccountPoller<A> {
    pub fn new(readings: ReadingClient<A>) -> Self {
        Self { readings }
    }

    pub fn readings(&self) -> &ReadingClient<A> {
        &self.readings
    }

    /// Run one poll step, mutating only this account's context.
    ///
    /// The schedule only advances when a reading is accepted, so any failure
    /// is retried on the next tick.
    pub async fn poll(&self, ctx: &mut AccountContext, now_ms: i64) -> PollOutcome {
        let Some(credentials) = ctx.valid_credentials().cloned() else {
            let err = ShareError::MissingCredentials;
            tracing::warn!(account = %ctx.id, "Missing Share credentials");
            ctx.error = err.user_message();
            return PollOutcome::Failed(err);
        };

        if !ctx.schedule.is_due(now_ms) {
            return PollOutcome::Skipped;
        }

        let batch = match self
            .readings
            .fetch_recent_readings(ctx.id, &credentials)
            .await
        {
            Ok(batch) => batch,
            Err(e) if e.is_soft() => {
                tracing::debug!(account = %ctx.id, reason = %e, "No data this cycle, retrying next tick");
                if let Some(message) = e.user_message() {
                    ctx.error = Some(message);
                }
                return PollOutcome::Skipped;
            }
            Err(e) => {
                ctx.error = e.user_message();
                return PollOutcome::Failed(e);
            }
        };

        let reading = match reconcile::reconcile(&batch) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(account = %ctx.id, error = %e, "Could not reconcile readings");
                ctx.error = e.user_message();
                return PollOutcome::Failed(e);
            }
        };

        ctx.schedule.on_reading_accepted(now_ms, reading.timestamp_ms);
        ctx.reading = Some(reading.clone());
        ctx.error = None;

        tracing::info!(
            account = %ctx.id,
            value = reading.value,
            trend = reading.trend_symbol(),
            delta = ?reading.delta_from_prior,
            reading_at = %format_millis_rfc3339(reading.timestamp_ms),
            next_poll_at = %format_millis_rfc3339(ctx.schedule.state().next_poll_due_at_ms),
            "Reading updated"
        );

        PollOutcome::Updated(reading)
    }
}
