//! Key-value persistence
//!
//! The core persists exactly one high-score integer and the settings blob,
//! both through this interface. Storage failures are never surfaced to the
//! simulation: reads fall back to defaults and writes are fire-and-forget.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Minimal string key-value store. Implementations swallow their own
/// failures.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store, used by tests and the headless demo.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// File-backed store keeping all keys in one JSON object.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> HashMap<String, String> {
        match fs::read_to_string(&self.path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                log::warn!("ignoring malformed store {}: {err}", self.path.display());
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        match serde_json::to_string(&map) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.path, json) {
                    log::warn!("failed to write {}: {err}", self.path.display());
                }
            }
            Err(err) => log::warn!("failed to serialize store: {err}"),
        }
    }
}
