//! Persisted key-value storage
//!
//! The client persists its record as independent string values under fixed
//! keys, in the manner of browser local storage. Values are JSON; an absent
//! key means "not established yet".
//!
//! - [`MemoryStore`]: process-local, for tests and embedding
//! - [`FileStore`]: one JSON file, rewritten on every change

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::StoreError;

/// Keys the client writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// `{"user", "transaction"}` from sign-in
    Auth,
    /// Whether a provider session is believed live
    Session,
    /// Last issued token set
    UserInfo,
    /// Last refreshed provider session object
    SessionObject,
    /// Last decoded ID token
    DecodedIdToken,
    /// Avatar URL from the resource server
    Image,
    /// Name reported by the resource server
    ImageName,
}

impl StorageKey {
    /// Every key, in record order
    pub const ALL: [StorageKey; 7] = [
        Self::Auth,
        Self::Session,
        Self::UserInfo,
        Self::SessionObject,
        Self::DecodedIdToken,
        Self::Image,
        Self::ImageName,
    ];

    /// Key as stored
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Session => "session",
            Self::UserInfo => "userInfo",
            Self::SessionObject => "sessionObject",
            Self::DecodedIdToken => "decodedIdToken",
            Self::Image => "image",
            Self::ImageName => "imageName",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous string store with last-write-wins semantics
pub trait KeyValueStore: Send + Sync {
    /// Raw value under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`
    fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete `key`; absent keys are fine
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Delete everything
    fn clear(&self) -> Result<(), StoreError>;
}

/// Read and parse the JSON value under `key`
///
/// # Errors
///
/// [`StoreError::Corrupt`] when the stored text is not a valid `T`.
pub fn load_json<T, S>(store: &S, key: StorageKey) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let Some(raw) = store.get(key.as_str())? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            key: key.as_str().to_string(),
            source,
        })
}

/// Serialize `value` as JSON under `key`
///
/// # Errors
///
/// Serialization or backend failures.
pub fn save_json<T, S>(store: &S, key: StorageKey, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
        key: key.as_str().to_string(),
        source,
    })?;
    store.set(key.as_str(), raw)
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.values.lock().clear();
        Ok(())
    }
}

/// Store backed by a single JSON object on disk
///
/// The whole file is loaded on open and rewritten (temp file + rename) on
/// every mutation. Concurrent processes are not coordinated.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, creating nothing until the first write
    ///
    /// # Errors
    ///
    /// [`StoreError::Io`] if the file exists but cannot be read,
    /// [`StoreError::Corrupt`] if it is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                key: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        debug!(path = %path.display(), keys = values.len(), "Opened file store");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let text = serde_json::to_string_pretty(values).map_err(|source| StoreError::Serialize {
            key: self.path.display().to_string(),
            source,
        })?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        trace!(path = %self.path.display(), "File store written");
        Ok(())
    }

    /// Apply `change` to a copy, write it, and only then make it visible
    ///
    /// `change` returns whether anything changed; unchanged maps are not
    /// written.
    fn update(
        &self,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StoreError> {
        let mut values = self.values.lock();
        let mut staged = values.clone();
        if !change(&mut staged) {
            return Ok(());
        }
        self.persist(&staged)?;
        *values = staged;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.update(|values| {
            values.insert(key.to_string(), value);
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|values| values.remove(key).is_some())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.update(|values| {
            values.clear();
            true
        })
    }
}
