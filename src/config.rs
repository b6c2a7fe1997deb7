//! Application configuration loaded from environment variables.
//!
//! Credentials given here only seed the state file; the state file is the
//! source of truth once the daemon is running.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SHARE_BASE_URL: &str = "https://share1.dexcom.com";
const DEFAULT_PROBE_URL: &str = "https://clients3.google.com/generate_204";
const DEFAULT_TICK_INTERVAL_SECS: u64 = 10;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
const DEFAULT_STATE_PATH: &str = "cgm-glance-state.json";

/// Credentials supplied through the environment for one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialSeed {
    pub label: Option<String>,
    pub username: String,
    pub password: String,
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Share API origin (no trailing slash)
    pub share_base_url: String,
    /// URL hit before authenticated calls to detect connectivity
    pub connectivity_probe_url: String,
    /// Fixed tick of the periodic timer
    pub tick_interval: Duration,
    /// Per-request timeout for every upstream call
    pub http_timeout: Duration,
    /// Key-value state file
    pub state_path: PathBuf,
    pub primary_seed: Option<CredentialSeed>,
    pub secondary_seed: Option<CredentialSeed>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            connectivity_probe_url: DEFAULT_PROBE_URL.to_string(),
            tick_interval: Duration::from_secs(DEFAULT_TICK_INTERVAL_SECS),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            primary_seed: None,
            secondary_seed: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let share_base_url = env::var("SHARE_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_SHARE_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !share_base_url.starts_with("http://") && !share_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid("SHARE_BASE_URL", share_base_url));
        }

        Ok(Self {
            share_base_url,
            connectivity_probe_url: env::var("CONNECTIVITY_PROBE_URL")
                .unwrap_or_else(|_| DEFAULT_PROBE_URL.to_string()),
            tick_interval: Duration::from_secs(secs_var(
                "TICK_INTERVAL_SECS",
                DEFAULT_TICK_INTERVAL_SECS,
            )),
            http_timeout: Duration::from_secs(secs_var(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )),
            state_path: env::var("STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH)),
            primary_seed: seed_from_env(""),
            secondary_seed: seed_from_env("_2"),
        })
    }
}

/// Parse a positive number of seconds, falling back to the default.
fn secs_var(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn seed_from_env(suffix: &str) -> Option<CredentialSeed> {
    let username = env::var(format!("SHARE_USERNAME{suffix}")).ok()?;
    let password = env::var(format!("SHARE_PASSWORD{suffix}")).ok()?;
    Some(CredentialSeed {
        label: env::var(format!("ACCOUNT_LABEL{suffix}")).ok(),
        username: username.trim().to_string(),
        password,
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("SHARE_BASE_URL", "http://127.0.0.1:9999/");
        env::set_var("TICK_INTERVAL_SECS", "not-a-number");
        env::set_var("HTTP_TIMEOUT_SECS", "3");
        env::set_var("SHARE_USERNAME", " parent ");
        env::set_var("SHARE_PASSWORD", "hunter22");
        env::remove_var("SHARE_USERNAME_2");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.share_base_url, "http://127.0.0.1:9999");
        assert_eq!(config.tick_interval, Duration::from_secs(10));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        let seed = config.primary_seed.expect("primary seed");
        assert_eq!(seed.username, "parent");
        assert_eq!(seed.password, "hunter22");
        assert!(config.secondary_seed.is_none());
    }
}
