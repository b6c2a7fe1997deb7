// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! cgm-glance daemon
//!
//! Polls the Share follower service on a fixed tick and renders the current
//! glucose value, trend, delta and staleness for each monitored account.

use cgm_glance::{
    config::{Config, CredentialSeed},
    db::{JsonFileStore, KeyValueStore},
    display::{LogRenderer, RenderSink},
    models::{AccountId, Credentials},
    services::{SettingsStore, ShareClient},
    time_utils::{local_hour, now_millis},
    Dashboard,
};
use std::sync::Arc;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");

    let store: Arc<dyn KeyValueStore> =
        Arc::new(JsonFileStore::open(&config.state_path).expect("Failed to open state file"));

    init_logging(SettingsStore::new(store.clone()).verbose_logging());
    tracing::info!(
        base_url = %config.share_base_url,
        tick_secs = config.tick_interval.as_secs(),
        state = %config.state_path.display(),
        "Starting cgm-glance"
    );

    let client = Arc::new(ShareClient::new(&config)?);
    let mut dashboard = Dashboard::new(client, store);

    seed_credentials(&mut dashboard, AccountId::Primary, config.primary_seed.as_ref());
    seed_credentials(&mut dashboard, AccountId::Secondary, config.secondary_seed.as_ref());

    let mut renderer = LogRenderer::default();
    let mut ticker = tokio::time::interval(config.tick_interval);
    // A slow tick delays the next one instead of bunching them up.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = now_millis();
                dashboard.tick(now).await;
                renderer.render(&dashboard.snapshots(now_millis(), local_hour()));
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Apply credentials from the environment as if edited in settings.
fn seed_credentials<A: cgm_glance::services::ShareApi>(
    dashboard: &mut Dashboard<A>,
    id: AccountId,
    seed: Option<&CredentialSeed>,
) {
    let Some(seed) = seed else { return };
    let label = seed.label.clone().unwrap_or_default();
    dashboard.update_credentials(
        id,
        Credentials::new(label, seed.username.clone(), seed.password.clone()),
    );
}

/// Initialize structured JSON logging.
fn init_logging(verbose: bool) {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let crate_level = if verbose {
        "cgm_glance=debug"
    } else {
        "cgm_glance=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(crate_level.parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
