// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - reading acquisition and reconciliation.

pub mod auth;
pub mod credentials;
pub mod poller;
pub mod readings;
pub mod reconcile;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod share;

pub use auth::AuthClient;
pub use credentials::CredentialStore;
pub use poller::{AccountPoller, PollOutcome};
pub use readings::ReadingClient;
pub use scheduler::PollScheduler;
pub use session::{SessionStore, SessionToken};
pub use settings::SettingsStore;
pub use share::{ShareApi, ShareClient};
