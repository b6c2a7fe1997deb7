//! Persistence layer (key-value state).

pub mod store;

pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

/// Persisted key names. Per-account keys take the account's suffix.
pub mod keys {
    pub const USERNAME: &str = "SHARE_USERNAME";
    pub const PASSWORD: &str = "SHARE_PASSWORD";
    pub const TOKEN: &str = "SHARE_TOKEN";
    pub const LABEL: &str = "ACCOUNT_LABEL";
    pub const COLOR: &str = "ACCOUNT_COLOR";
    /// Shared across accounts
    pub const NIGHT_BRIGHTNESS: &str = "NIGHT_BRIGHTNESS";
    /// Shared across accounts
    pub const VERBOSE_LOGGING: &str = "VERBOSE_LOGGING";
}
