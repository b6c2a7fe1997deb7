// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Choosing the canonical current and prior samples from a noisy batch.
//!
//! A batch may hold near-simultaneous reports of the same reading from
//! several devices (e.g. phone and watch), in any order. All functions here
//! are pure.

use crate::error::{Result, ShareError};
use crate::models::{NormalizedReading, RawSample, Trend};
use chrono::DateTime;

/// Two newest samples at most this far apart are treated as one reading (2m).
pub const DUPLICATE_WINDOW_MS: i64 = 120_000;

/// A prior sample must be strictly older than the newest by more than this (4m).
pub const PRIOR_MIN_GAP_MS: i64 = 240_000;

/// A sample with its wall time decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedSample {
    pub timestamp_ms: i64,
    pub value: i32,
    pub trend: Trend,
}

/// Decode the `Date(<epoch ms>)` wall-time encoding.
///
/// A trailing timezone offset (`Date(1700000000000-0500)`) is ignored; the
/// millisecond count is already UTC. Counts outside chrono's representable
/// range are rejected.
pub fn parse_wall_time(raw: &str) -> Result<i64> {
    let malformed = || ShareError::MalformedResponse(format!("Invalid date format: {raw}"));

    let start = raw.find("Date(").ok_or_else(malformed)? + "Date(".len();
    let rest = &raw[start..];
    let digits_len = rest
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());

    let millis = rest[..digits_len].parse::<i64>().map_err(|_| malformed())?;
    DateTime::from_timestamp_millis(millis).ok_or_else(malformed)?;
    Ok(millis)
}

/// Decode every sample and sort newest first. Ties keep upstream order.
pub fn sort_newest_first(batch: &[RawSample]) -> Result<Vec<TimedSample>> {
    let mut timed = batch
        .iter()
        .map(|s| {
            Ok(TimedSample {
                timestamp_ms: parse_wall_time(&s.wall_time_raw)?,
                value: s.value,
                trend: Trend::from_code(&s.trend),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    timed.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
    Ok(timed)
}

/// Pick the canonical current sample.
///
/// When the two newest are within [`DUPLICATE_WINDOW_MS`] of each other the
/// slightly older one wins; otherwise the newest.
pub fn pick_current_sample(batch: &[RawSample]) -> Result<TimedSample> {
    let sorted = sort_newest_first(batch)?;
    match sorted.as_slice() {
        [] => Err(ShareError::NoReadings),
        [newest, second, ..]
            if newest.timestamp_ms.saturating_sub(second.timestamp_ms) <= DUPLICATE_WINDOW_MS =>
        {
            Ok(*second)
        }
        [newest, ..] => Ok(*newest),
    }
}

/// Value of the newest sample more than [`PRIOR_MIN_GAP_MS`] older than the newest.
pub fn pick_prior_value(batch: &[RawSample]) -> Result<i32> {
    let sorted = sort_newest_first(batch)?;
    let newest = sorted.first().ok_or(ShareError::NoReadings)?.timestamp_ms;

    sorted
        .iter()
        .find(|s| newest.saturating_sub(s.timestamp_ms) > PRIOR_MIN_GAP_MS)
        .map(|s| s.value)
        .ok_or(ShareError::NoPriorSample)
}

/// Build the reading shown for a batch.
///
/// Value, trend and timestamp all come from the chosen current sample. A
/// missing prior only makes the delta unavailable.
pub fn reconcile(batch: &[RawSample]) -> Result<NormalizedReading> {
    let current = pick_current_sample(batch)?;

    let delta_from_prior = match pick_prior_value(batch) {
        Ok(prior) if current.value > 0 && prior > 0 => Some(current.value - prior),
        Ok(_) => None,
        Err(ShareError::NoPriorSample) => {
            tracing::debug!("No prior sample outside the duplicate window, delta unavailable");
            None
        }
        Err(e) => return Err(e),
    };

    Ok(NormalizedReading {
        timestamp_ms: current.timestamp_ms,
        value: current.value,
        trend: current.trend,
        delta_from_prior,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ts: i64, value: i32) -> RawSample {
        RawSample {
            wall_time_raw: format!("Date({ts})"),
            value,
            trend: "Flat".to_string(),
        }
    }

    #[test]
    fn parse_wall_time_variants() {
        assert_eq!(parse_wall_time("Date(1700000000000)").unwrap(), 1_700_000_000_000);
        assert_eq!(
            parse_wall_time("/Date(1700000000000-0500)/").unwrap(),
            1_700_000_000_000
        );
        assert_eq!(
            parse_wall_time("Date(1700000000000+0100)").unwrap(),
            1_700_000_000_000
        );
    }

    #[test]
    fn parse_wall_time_rejects_garbage() {
        assert!(matches!(
            parse_wall_time("2023-11-14T22:13:20Z"),
            Err(ShareError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_wall_time("Date()"),
            Err(ShareError::MalformedResponse(_))
        ));
    }

    #[test]
    fn parse_wall_time_rejects_out_of_range() {
        for raw in ["Date(9223372036854775807)", "Date(-9223372036854775808)"] {
            assert!(
                matches!(parse_wall_time(raw), Err(ShareError::MalformedResponse(_))),
                "{raw} should be rejected"
            );
        }
        assert!(parse_wall_time("Date(-1000)").is_ok());
    }

    #[test]
    fn extreme_timestamps_fail_without_panicking() {
        let batch = vec![sample(i64::MAX, 100), sample(i64::MIN, 101)];
        assert!(matches!(
            reconcile(&batch),
            Err(ShareError::MalformedResponse(_))
        ));
    }

    #[test]
    fn tight_pair_boundary_is_inclusive() {
        let t = 1_700_000_000_000;
        let batch = vec![sample(t, 100), sample(t - DUPLICATE_WINDOW_MS, 101)];
        assert_eq!(
            pick_current_sample(&batch).unwrap().timestamp_ms,
            t - DUPLICATE_WINDOW_MS
        );

        let batch = vec![sample(t, 100), sample(t - DUPLICATE_WINDOW_MS - 1, 101)];
        assert_eq!(pick_current_sample(&batch).unwrap().timestamp_ms, t);
    }

    #[test]
    fn single_sample_is_current_without_prior() {
        let t = 1_700_000_000_000;
        let batch = vec![sample(t, 140)];
        assert_eq!(pick_current_sample(&batch).unwrap().timestamp_ms, t);
        assert!(matches!(
            pick_prior_value(&batch),
            Err(ShareError::NoPriorSample)
        ));

        let reading = reconcile(&batch).unwrap();
        assert_eq!(reading.value, 140);
        assert_eq!(reading.delta_from_prior, None);
    }

    #[test]
    fn empty_batch_has_no_readings() {
        assert!(matches!(pick_current_sample(&[]), Err(ShareError::NoReadings)));
        assert!(matches!(reconcile(&[]), Err(ShareError::NoReadings)));
    }

    #[test]
    fn unavailable_value_suppresses_delta() {
        let t = 1_700_000_000_000;
        let batch = vec![sample(t, 0), sample(t - 300_000, 120)];
        let reading = reconcile(&batch).unwrap();
        assert!(!reading.has_value());
        assert_eq!(reading.delta_from_prior, None);
    }
}
