//! JSON-file session store
//!
//! Persists session keys between runs of the terminal client, the way
//! browser local storage survives page loads.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;

use crate::error::{Error, Result};
use crate::storage::{SessionKey, SessionStore};

/// Session store backed by a JSON object on disk
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Opened session store");

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Open the store in the platform data directory
    pub fn open_default() -> Result<Self> {
        Self::open(Self::data_path()?.join("session.json"))
    }

    fn data_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "smartlpd", "smartlpd").ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;

        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }

    fn with_values<T>(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> T) -> Result<T> {
        let mut values = self.values.lock().map_err(|_| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "session store lock poisoned",
            ))
        })?;
        let out = f(&mut values);
        self.persist(&values)?;
        Ok(out)
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.values.lock().ok()?.get(key.as_str()).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<()> {
        self.with_values(|values| {
            values.insert(key.as_str().to_string(), value.to_string());
        })
    }

    fn remove(&self, key: SessionKey) -> Result<()> {
        self.with_values(|values| {
            values.remove(key.as_str());
        })
    }
}
