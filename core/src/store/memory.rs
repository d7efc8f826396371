use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::{CacheStore, MetadataStore};
use crate::model::SessionMetadata;

/// In-memory cache used by tests and offline runs.
pub struct MemoryCacheStore {
    inner: Mutex<HashMap<String, Value>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCacheStore {
    fn put(&self, key: &str, value: &Value) -> bool {
        if let Ok(mut entries) = self.inner.lock() {
            entries.insert(key.to_string(), value.clone());
            true
        } else {
            false
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.inner.lock().ok()?.get(key).cloned()
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.inner.lock() {
            entries.remove(key);
        }
    }
}

/// In-memory metadata slot mirroring the single-key persistent store.
pub struct MemoryMetadataStore {
    inner: Mutex<Option<SessionMetadata>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }
}

impl Default for MemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn set(&self, metadata: &SessionMetadata) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = Some(metadata.clone());
        }
    }

    fn get(&self) -> Option<SessionMetadata> {
        self.inner.lock().ok()?.clone()
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.inner.lock() {
            *slot = None;
        }
    }
}
