// Cache store backing every remote data access path.
// One JSON document mapping keys to TTL-stamped values, loaded lazily once
// per process and rewritten in full on each mutation.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{EmberError, Result};

/// A single cached value with its expiry instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub expires_at: DateTime<Utc>,
    pub value: Value,
}

impl CacheEntry {
    pub fn new(value: Value, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365));
        Self {
            expires_at: Utc::now() + ttl,
            value,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// TTL-keyed persistence shared by every data access path.
///
/// `get` never returns an entry past its expiry; expired entries are
/// deleted on read and the deletion persisted. `set` overwrites and writes
/// the whole document through immediately.
pub struct CacheStore {
    path: Option<PathBuf>,
    memory_only: bool,
    entries: Option<BTreeMap<String, CacheEntry>>,
}

impl CacheStore {
    /// A store persisting to the given document path.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            memory_only: false,
            entries: None,
        }
    }

    /// A store that bypasses lookups and persistence entirely (`--no-cache`).
    pub fn disabled() -> Self {
        Self {
            path: None,
            memory_only: false,
            entries: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Stop persisting after a reported write failure; the in-memory map
    /// keeps serving for the rest of the session.
    pub fn degrade_to_memory(&mut self) {
        self.memory_only = true;
    }

    /// Look up a key, deleting it (and persisting the deletion) when the
    /// current time has passed its expiry.
    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        if !self.is_enabled() {
            return Ok(None);
        }
        let now = Utc::now();
        let expired = matches!(self.entries().get(key), Some(entry) if entry.is_expired(now));
        if expired {
            self.entries().remove(key);
            self.persist()?;
            tracing::debug!(key, "expired cache entry removed");
            return Ok(None);
        }
        Ok(self.entries().get(key).map(|entry| entry.value.clone()))
    }

    /// Insert or overwrite a key and write the document through.
    pub fn set(&mut self, key: &str, value: Value, ttl: Duration) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        self.entries()
            .insert(key.to_string(), CacheEntry::new(value, ttl));
        self.persist()
    }

    /// Typed lookup; a cached value that no longer deserializes as `T` is
    /// treated as absent.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(value) => match serde_json::from_value(value) {
                Ok(parsed) => Ok(Some(parsed)),
                Err(err) => {
                    tracing::debug!(key, error = %err, "stale cache shape ignored");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Typed insert.
    pub fn set_as<T: Serialize>(&mut self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        self.set(key, serde_json::to_value(value)?, ttl)
    }

    fn entries(&mut self) -> &mut BTreeMap<String, CacheEntry> {
        let path = self.path.clone();
        self.entries
            .get_or_insert_with(|| load_document(path.as_deref()))
    }

    /// Rewrite the whole document (atomic temp file + rename).
    fn persist(&self) -> Result<()> {
        if self.memory_only {
            return Ok(());
        }
        let (Some(path), Some(entries)) = (self.path.as_ref(), self.entries.as_ref()) else {
            return Ok(());
        };
        let json = serde_json::to_string(entries)?;
        write_atomic(path, &json).map_err(EmberError::CachePersist)
    }
}

fn load_document(path: Option<&Path>) -> BTreeMap<String, CacheEntry> {
    let Some(path) = path else {
        return BTreeMap::new();
    };
    if !path.exists() {
        return BTreeMap::new();
    }
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(error = %err, "unreadable cache document, starting empty");
            return BTreeMap::new();
        }
    };
    match serde_json::from_str(&contents) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, "corrupt cache document, starting empty");
            BTreeMap::new()
        }
    }
}

fn write_atomic(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CacheStore {
        CacheStore::new(dir.path().join("cache.json"))
    }

    #[test]
    fn test_set_then_get_returns_value() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .set("item:1", json!({"id": 1}), Duration::from_secs(60))
            .unwrap();
        let value = store.get("item:1").unwrap();
        assert_eq!(value, Some(json!({"id": 1})));
    }

    #[test]
    fn test_expired_entry_is_removed_and_deletion_persisted() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .set("item:1", json!("stale"), Duration::ZERO)
            .unwrap();
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(store.get("item:1").unwrap(), None);

        let on_disk = fs::read_to_string(dir.path().join("cache.json")).unwrap();
        assert!(!on_disk.contains("item:1"));
    }

    #[test]
    fn test_values_survive_across_store_instances() {
        let dir = TempDir::new().unwrap();
        {
            let mut store = store_in(&dir);
            store
                .set("feed:topstories", json!([1, 2, 3]), Duration::from_secs(60))
                .unwrap();
        }
        let mut reopened = store_in(&dir);
        assert_eq!(
            reopened.get("feed:topstories").unwrap(),
            Some(json!([1, 2, 3]))
        );
    }

    #[test]
    fn test_overwrite_replaces_previous_value() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .set("k", json!("old"), Duration::from_secs(60))
            .unwrap();
        store
            .set("k", json!("new"), Duration::from_secs(60))
            .unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!("new")));
    }

    #[test]
    fn test_corrupt_document_treated_as_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = CacheStore::new(path);
        assert_eq!(store.get("anything").unwrap(), None);
        // The store stays usable after the bad load.
        store
            .set("k", json!(1), Duration::from_secs(60))
            .unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_disabled_store_never_touches_disk() {
        let dir = TempDir::new().unwrap();
        let mut store = CacheStore::disabled();

        store
            .set("k", json!(1), Duration::from_secs(60))
            .unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_memory_only_mode_stops_persisting_but_keeps_serving() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        store
            .set("before", json!(1), Duration::from_secs(60))
            .unwrap();

        store.degrade_to_memory();
        store
            .set("after", json!(2), Duration::from_secs(60))
            .unwrap();
        assert_eq!(store.get("after").unwrap(), Some(json!(2)));

        let on_disk = fs::read_to_string(dir.path().join("cache.json")).unwrap();
        assert!(on_disk.contains("before"));
        assert!(!on_disk.contains("after"));
    }

    #[test]
    fn test_typed_lookup_ignores_stale_shape() {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);

        store
            .set_as("k", &"a string", Duration::from_secs(60))
            .unwrap();
        let as_ids: Option<Vec<u64>> = store.get_as("k").unwrap();
        assert_eq!(as_ids, None);
        let as_string: Option<String> = store.get_as("k").unwrap();
        assert_eq!(as_string, Some("a string".to_string()));
    }
}
