// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-account poll scheduling keyed off the upstream sample's own timestamp.
//!
//! The sensor reports roughly every five minutes. Scheduling from the
//! device timestamp keeps polls aligned with new data; if the newest sample
//! is already stale the scheduler falls back to a fixed wall-clock retry.

use serde::Serialize;

/// A sample older than this (relative to now) is considered stale (5m30s).
pub const STALE_SAMPLE_AGE_MS: i64 = 330_000;

/// Wait after a stale sample before polling again (5m).
pub const STALE_RETRY_MS: i64 = 300_000;

/// Expected next sample: device timestamp plus native cadence and slack (5m15s).
pub const NEXT_SAMPLE_OFFSET_MS: i64 = 315_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchedulePhase {
    /// No reading accepted yet (or schedule reset)
    Due,
    WaitingNormal,
    WaitingAfterStale,
}

/// Scheduling state for one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleState {
    pub last_reading_timestamp_ms: Option<i64>,
    pub next_poll_due_at_ms: i64,
}

#[derive(Debug, Clone)]
pub struct PollScheduler {
    state: ScheduleState,
    phase: SchedulePhase,
}

impl Default for PollScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl PollScheduler {
    pub fn new() -> Self {
        Self {
            state: ScheduleState {
                last_reading_timestamp_ms: None,
                next_poll_due_at_ms: 0,
            },
            phase: SchedulePhase::Due,
        }
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    /// Phase as of the last transition. `Waiting*` phases become due by time alone.
    pub fn phase(&self) -> SchedulePhase {
        self.phase
    }

    pub fn is_due(&self, now_ms: i64) -> bool {
        now_ms >= self.state.next_poll_due_at_ms
    }

    /// Record an accepted reading and compute when to poll next.
    pub fn on_reading_accepted(&mut self, now_ms: i64, sample_timestamp_ms: i64) {
        if now_ms > sample_timestamp_ms.saturating_add(STALE_SAMPLE_AGE_MS) {
            self.state.next_poll_due_at_ms = now_ms.saturating_add(STALE_RETRY_MS);
            self.phase = SchedulePhase::WaitingAfterStale;
        } else {
            self.state.next_poll_due_at_ms =
                sample_timestamp_ms.saturating_add(NEXT_SAMPLE_OFFSET_MS);
            self.phase = SchedulePhase::WaitingNormal;
        }
        self.state.last_reading_timestamp_ms = Some(sample_timestamp_ms);
    }

    /// Make the next tick poll immediately (e.g. after a credential edit).
    pub fn reset(&mut self) {
        self.state.next_poll_due_at_ms = 0;
        self.phase = SchedulePhase::Due;
    }
}
