//! Injectable persistence seams for the cached analysis blob and the
//! session metadata that accompanies it.

mod file;
mod memory;

pub use file::{FileCacheStore, FileMetadataStore};
pub use memory::{MemoryCacheStore, MemoryMetadataStore};

use serde_json::Value;

use crate::model::SessionMetadata;

/// Key-value blob cache holding the raw analysis JSON across page loads.
///
/// Failures never propagate to callers: `put` logs and reports `false`,
/// `get` treats unreadable or undecodable entries as absent. Values are
/// replaced atomically; readers never observe a partial write.
pub trait CacheStore: Send + Sync {
    fn put(&self, key: &str, value: &Value) -> bool;
    fn get(&self, key: &str) -> Option<Value>;
    fn remove(&self, key: &str);
}

/// Small persistent store for session metadata. `set` and `clear` silently
/// no-op when the backing store is unavailable.
pub trait MetadataStore: Send + Sync {
    fn set(&self, metadata: &SessionMetadata);
    fn get(&self) -> Option<SessionMetadata>;
    fn clear(&self);
}
