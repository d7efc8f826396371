use std::fs;
use std::io;
use std::path::PathBuf;

use log::warn;
use serde_json::Value;

use super::{CacheStore, MetadataStore};
use crate::model::SessionMetadata;

/// Blob cache backed by one JSON file per key under a data directory.
pub struct FileCacheStore {
    dir: PathBuf,
}

impl FileCacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn try_put(&self, key: &str, value: &Value) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let bytes = serde_json::to_vec(value).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        // Write-then-rename so a concurrent reader never sees a torn blob.
        let staging = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&staging, bytes)?;
        fs::rename(&staging, self.path_for(key))?;
        Ok(())
    }
}

impl CacheStore for FileCacheStore {
    fn put(&self, key: &str, value: &Value) -> bool {
        match self.try_put(key, value) {
            Ok(()) => true,
            Err(err) => {
                warn!("cache write for {key} failed: {err}");
                false
            }
        }
    }

    fn get(&self, key: &str) -> Option<Value> {
        let bytes = fs::read(self.path_for(key)).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// Session metadata persisted as a single small JSON file.
pub struct FileMetadataStore {
    path: PathBuf,
}

impl FileMetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn try_set(&self, metadata: &SessionMetadata) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes =
            serde_json::to_vec_pretty(metadata).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        fs::write(&self.path, bytes)
    }
}

impl MetadataStore for FileMetadataStore {
    fn set(&self, metadata: &SessionMetadata) {
        if let Err(err) = self.try_set(metadata) {
            warn!("metadata write to {} failed: {err}", self.path.display());
        }
    }

    fn get(&self) -> Option<SessionMetadata> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn cache_round_trips_arbitrary_json() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path());
        let value = json!({
            "total_packets": 100,
            "Protocol": [{ "name": "TCP", "packets": 100, "percentage": 100.0 }]
        });
        assert!(store.put("analysis-data", &value));
        assert_eq!(store.get("analysis-data"), Some(value));
    }

    #[test]
    fn put_overwrites_previous_entry() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path());
        store.put("analysis-data", &json!({ "total_packets": 1 }));
        store.put("analysis-data", &json!({ "total_packets": 2 }));
        assert_eq!(
            store.get("analysis-data"),
            Some(json!({ "total_packets": 2 }))
        );
    }

    #[test]
    fn corrupt_blob_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("analysis-data.json"), b"{ not json").unwrap();
        assert_eq!(store.get("analysis-data"), None);
    }

    #[test]
    fn remove_makes_entry_absent() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::new(dir.path());
        store.put("analysis-data", &json!({}));
        store.remove("analysis-data");
        assert_eq!(store.get("analysis-data"), None);
    }

    #[test]
    fn metadata_set_get_clear() {
        let dir = TempDir::new().unwrap();
        let store = FileMetadataStore::new(dir.path().join("analysis-metadata.json"));
        assert_eq!(store.get(), None);
        let metadata = SessionMetadata {
            original_filename: "t.pcapng".to_string(),
            timestamp: "2024-01-01T00:00:00Z".parse().unwrap(),
        };
        store.set(&metadata);
        assert_eq!(store.get(), Some(metadata));
        store.clear();
        assert_eq!(store.get(), None);
    }
}
