// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod account;
pub mod reading;

pub use account::{AccountContext, AccountId, Credentials};
pub use reading::{NormalizedReading, RawSample, Trend};
