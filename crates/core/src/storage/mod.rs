//! Client-side session storage
//!
//! A string key/value store standing in for browser local storage. The
//! controllers only ever see the [`SessionStore`] trait, so tests run
//! against [`MemoryStore`] while the terminal client persists to disk
//! through [`FileStore`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::fmt;

use crate::error::Result;

/// Well-known storage keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    AuthToken,
    Username,
    UserRole,
    /// Plate handed from the detection page to the management page
    DetectedPlate,
}

impl SessionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKey::AuthToken => "authToken",
            SessionKey::Username => "username",
            SessionKey::UserRole => "userRole",
            SessionKey::DetectedPlate => "detectedPlate",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read/write interface over session state
pub trait SessionStore: Send + Sync {
    /// Get a value, `None` if absent
    fn get(&self, key: SessionKey) -> Option<String>;

    /// Set a value, replacing any previous one
    fn set(&self, key: SessionKey, value: &str) -> Result<()>;

    /// Remove a value; removing an absent key is not an error
    fn remove(&self, key: SessionKey) -> Result<()>;

    /// Get and remove a value in one step
    fn take(&self, key: SessionKey) -> Result<Option<String>> {
        let value = self.get(key);
        if value.is_some() {
            self.remove(key)?;
        }
        Ok(value)
    }
}
