//! Persisted values over a durable key-value store.
//!
//! Values are exchanged with the store as JSON text. Reads never fail: a
//! missing or undecodable value degrades to the caller's default. Writes are
//! synchronous and durable before they return.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use jobdeck_core::{Error, KeyValueStore, Result};

/// Decode the value stored under `key`, or return `default`.
///
/// The default is not written back.
pub fn read<T, S>(store: &S, key: &str, default: T) -> T
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(subsystem = "store", store_key = key, "No stored value, using default");
            return default;
        }
        Err(e) => {
            warn!(subsystem = "store", store_key = key, error = %e, "Store read failed, using default");
            return default;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            let err = Error::PersistenceDecode(e.to_string());
            warn!(subsystem = "store", store_key = key, error = %err, "Stored value unreadable, using default");
            default
        }
    }
}

/// Serialize `value` and store it durably under `key`.
pub fn write<T, S>(store: &S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// In-memory value mirrored to a durable store on every write.
pub struct PersistedValue<T> {
    store: Arc<dyn KeyValueStore>,
    key: String,
    value: Mutex<T>,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Recover the last durable value for `key`, or start from `default`.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
        Self::load_normalized(store, key, default, |value| value)
    }

    /// Like [`PersistedValue::load`], passing the recovered value through
    /// `normalize` first. The normalized value is not written back.
    pub fn load_normalized(
        store: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        default: T,
        normalize: impl FnOnce(T) -> T,
    ) -> Self {
        let key = key.into();
        let value = normalize(read(store.as_ref(), &key, default));
        Self {
            store,
            key,
            value: Mutex::new(value),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current in-memory value.
    pub fn get(&self) -> T {
        self.lock().clone()
    }

    /// Persist `value`, then make it the in-memory value.
    ///
    /// On a store error the in-memory value is left unchanged.
    pub fn set(&self, value: T) -> Result<()> {
        let mut current = self.lock();
        write(self.store.as_ref(), &self.key, &value)?;
        *current = value;
        Ok(())
    }

    /// Derive the next value from the current one and persist it atomically
    /// with respect to other writers of this value. Returns the new value.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Result<T> {
        let mut current = self.lock();
        let next = f(&current);
        write(self.store.as_ref(), &self.key, &next)?;
        *current = next.clone();
        Ok(next)
    }

    fn lock(&self) -> MutexGuard<'_, T> {
        self.value.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// =============================================================================
// BACKENDS
// =============================================================================

/// Process-local store. Clones share the same map, so dropping every state
/// built on one clone and reloading from another simulates a restart.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory-backed store with one JSON file per key.
///
/// Writes go to a temporary file that is fsynced and then renamed over the
/// target, so a crash leaves either the old or the new value.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!(subsystem = "store", component = "file_store", dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Persistence(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let persist = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };
        persist().map_err(|e| {
            Error::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })?;
        debug!(subsystem = "store", component = "file_store", store_key = key, "Persisted value");
        Ok(())
    }
}
