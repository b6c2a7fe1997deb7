// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-value stores backing sessions, credentials and settings.
//!
//! Provides:
//! - `MemoryStore` (process-local, used by tests and as the file store's cache)
//! - `JsonFileStore` (survives restarts, one JSON object on disk)

use crate::error::{Result, ShareError};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Injectable string key-value persistence.
///
/// Absence is a normal state, so reads return `Option` and writes never fail
/// from the caller's point of view.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot in key order (used for persisting).
    fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Store persisted as a single JSON object, rewritten on every mutation.
pub struct JsonFileStore {
    path: PathBuf,
    cache: MemoryStore,
    /// Serializes file rewrites.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store, loading existing contents. A missing file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let cache = MemoryStore::new();

        match std::fs::read(&path) {
            Ok(bytes) => {
                let entries: BTreeMap<String, String> = serde_json::from_slice(&bytes)
                    .map_err(|e| {
                        ShareError::Storage(format!("Failed to parse {}: {}", path.display(), e))
                    })?;
                for (key, value) in entries {
                    cache.set(&key, &value);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ShareError::Storage(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        }

        tracing::info!(path = %path.display(), entries = cache.len(), "State store opened");

        Ok(Self {
            path,
            cache,
            write_lock: Mutex::new(()),
        })
    }

    fn persist(&self) {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Err(e) = self.write_snapshot() {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to persist state");
        }
    }

    fn write_snapshot(&self) -> Result<()> {
        let payload = serde_json::to_vec_pretty(&self.cache.snapshot())
            .map_err(|e| ShareError::Storage(e.to_string()))?;

        // Write-then-rename so a crash never leaves a truncated file.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, payload).map_err(|e| ShareError::Storage(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| ShareError::Storage(e.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.cache.get(key)
    }

    fn set(&self, key: &str, value: &str) {
        if self.cache.get(key).as_deref() == Some(value) {
            return;
        }
        self.cache.set(key, value);
        self.persist();
    }

    fn remove(&self, key: &str) {
        if self.cache.get(key).is_none() {
            return;
        }
        self.cache.remove(key);
        self.persist();
    }
}
