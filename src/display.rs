//! Display-only values derived from an account's last known reading.
//!
//! Recomputed every tick, whether or not a fetch happened, so the
//! staleness indicator keeps growing while upstream is unreachable.

use crate::models::{AccountContext, AccountId, NormalizedReading};
use serde::Serialize;

/// Minutes after which the last reading is flagged as stale.
pub const STALE_AFTER_MINUTES: i64 = 10;

/// Text shown when the sensor reported no value.
pub const UNAVAILABLE_VALUE: &str = "???";

/// What a renderer shows for one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    pub account: AccountId,
    pub label: String,
    pub color: Option<String>,
    pub value_text: String,
    pub trend_symbol: String,
    pub delta_text: String,
    /// `None` before the first reading
    pub minutes_since_reading: Option<i64>,
    pub last_reading_text: String,
    pub is_stale: bool,
    pub error: Option<String>,
    pub opacity: f32,
}

impl DisplaySnapshot {
    pub fn from_context(ctx: &AccountContext, now_ms: i64) -> Self {
        let minutes = ctx
            .reading
            .as_ref()
            .map(|r| minutes_since(r.timestamp_ms, now_ms));

        Self {
            account: ctx.id,
            label: ctx.label(),
            color: None,
            value_text: ctx.reading.as_ref().map(value_text).unwrap_or_default(),
            trend_symbol: ctx
                .reading
                .as_ref()
                .map(|r| r.trend_symbol().to_string())
                .unwrap_or_default(),
            delta_text: ctx
                .reading
                .as_ref()
                .and_then(|r| r.delta_from_prior)
                .map(delta_text)
                .unwrap_or_default(),
            minutes_since_reading: minutes,
            last_reading_text: minutes.map(last_reading_text).unwrap_or_default(),
            is_stale: minutes.is_some_and(|m| m > STALE_AFTER_MINUTES),
            error: ctx.error.clone(),
            opacity: 1.0,
        }
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Whole minutes elapsed, rounded down.
pub fn minutes_since(timestamp_ms: i64, now_ms: i64) -> i64 {
    now_ms.saturating_sub(timestamp_ms).div_euclid(60_000)
}

pub fn value_text(reading: &NormalizedReading) -> String {
    if reading.has_value() {
        reading.value.to_string()
    } else {
        UNAVAILABLE_VALUE.to_string()
    }
}

pub fn delta_text(delta: i32) -> String {
    if delta >= 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    }
}

pub fn last_reading_text(minutes: i64) -> String {
    if minutes < 1 {
        "just now".to_string()
    } else {
        format!("{minutes} minutes ago")
    }
}

/// Consumer of per-tick display snapshots.
pub trait RenderSink {
    fn render(&mut self, snapshots: &[DisplaySnapshot]);
}

/// Renders snapshots as structured log lines.
#[derive(Debug, Default)]
pub struct LogRenderer {
    last: Vec<DisplaySnapshot>,
}

impl RenderSink for LogRenderer {
    fn render(&mut self, snapshots: &[DisplaySnapshot]) {
        // Only log when something visible changed.
        if self.last.as_slice() == snapshots {
            return;
        }
        for s in snapshots {
            tracing::info!(
                account = %s.account,
                label = %s.label,
                value = %s.value_text,
                trend = %s.trend_symbol,
                delta = %s.delta_text,
                last_reading = %s.last_reading_text,
                stale = s.is_stale,
                error = s.error.as_deref().unwrap_or(""),
                opacity = s.opacity,
                "Display"
            );
        }
        self.last = snapshots.to_vec();
    }
}
