//! Key-value settings storage.
//!
//! A minimal string-to-string contract; the sync watermark and other
//! small pieces of device state live here rather than in their own
//! tables.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::CoreResult;

/// Durable key-value settings.
pub trait SettingsStore: Send + Sync {
    /// Fetches a value by key.
    fn get_value(&self, key: &str) -> CoreResult<Option<String>>;

    /// Stores a value, replacing any previous one.
    fn set_value(&self, key: &str, value: &str) -> CoreResult<()>;
}

/// In-memory settings, used in tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySettings {
    /// Creates an empty settings store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get_value(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set_value(&self, key: &str, value: &str) -> CoreResult<()> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
