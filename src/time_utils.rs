// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, Local, SecondsFormat, Timelike, Utc};

/// Current wall-clock time as epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current local hour (0..=23).
pub fn local_hour() -> u32 {
    Local::now().hour()
}

/// Format epoch milliseconds as RFC3339 using a `Z` suffix.
pub fn format_millis_rfc3339(millis: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(millis) {
        Some(date) => date.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => format!("invalid({millis})"),
    }
}
