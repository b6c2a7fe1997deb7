//! Shared display settings: night brightness, verbose logging, account colours.

use crate::db::{keys, KeyValueStore};
use crate::models::AccountId;
use std::sync::Arc;

/// Brightness steps; also the full-brightness level.
pub const BRIGHTNESS_STEPS: u8 = 20;

/// Dimmest allowed night level.
pub const MIN_NIGHT_BRIGHTNESS: u8 = 2;

/// Night runs from 20:00 to 06:59 local time.
pub fn is_night(local_hour: u32) -> bool {
    local_hour >= 20 || local_hour < 7
}

/// Display opacity for a brightness level.
pub fn opacity(level: u8) -> f32 {
    f32::from(level.min(BRIGHTNESS_STEPS)) / f32::from(BRIGHTNESS_STEPS)
}

#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored night brightness, defaulting to full and clamped to the valid range.
    pub fn night_brightness(&self) -> u8 {
        self.store
            .get(keys::NIGHT_BRIGHTNESS)
            .and_then(|v| v.trim().parse::<u8>().ok())
            .unwrap_or(BRIGHTNESS_STEPS)
            .clamp(MIN_NIGHT_BRIGHTNESS, BRIGHTNESS_STEPS)
    }

    pub fn set_night_brightness(&self, level: u8) -> u8 {
        let level = level.clamp(MIN_NIGHT_BRIGHTNESS, BRIGHTNESS_STEPS);
        self.store
            .set(keys::NIGHT_BRIGHTNESS, &level.to_string());
        level
    }

    pub fn increase_brightness(&self) -> u8 {
        self.set_night_brightness(self.night_brightness().saturating_add(1))
    }

    pub fn decrease_brightness(&self) -> u8 {
        self.set_night_brightness(self.night_brightness().saturating_sub(1))
    }

    /// Opacity to apply right now.
    pub fn current_opacity(&self, local_hour: u32) -> f32 {
        if is_night(local_hour) {
            opacity(self.night_brightness())
        } else {
            opacity(BRIGHTNESS_STEPS)
        }
    }

    pub fn verbose_logging(&self) -> bool {
        matches!(
            self.store.get(keys::VERBOSE_LOGGING).as_deref(),
            Some("true") | Some("1")
        )
    }

    pub fn set_verbose_logging(&self, verbose: bool) {
        self.store
            .set(keys::VERBOSE_LOGGING, if verbose { "true" } else { "false" });
    }

    pub fn account_color(&self, account: AccountId) -> Option<String> {
        self.store.get(&account.key(keys::COLOR))
    }

    pub fn set_account_color(&self, account: AccountId, color: &str) {
        self.store.set(&account.key(keys::COLOR), color);
    }
}
