//! In-memory session store

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::Result;
use crate::storage::{SessionKey, SessionStore};

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<SessionKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: SessionKey) -> Option<String> {
        self.values.lock().ok()?.get(&key).cloned()
    }

    fn set(&self, key: SessionKey, value: &str) -> Result<()> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key, value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: SessionKey) -> Result<()> {
        if let Ok(mut values) = self.values.lock() {
            values.remove(&key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.is_empty());

        store.set(SessionKey::Username, "alice").unwrap();
        assert_eq!(store.get(SessionKey::Username).as_deref(), Some("alice"));

        store.set(SessionKey::Username, "bob").unwrap();
        assert_eq!(store.get(SessionKey::Username).as_deref(), Some("bob"));
        assert_eq!(store.len(), 1);

        store.remove(SessionKey::Username).unwrap();
        assert!(store.get(SessionKey::Username).is_none());
        store.remove(SessionKey::Username).unwrap();
    }

    #[test]
    fn test_take_removes_value() {
        let store = MemoryStore::new();
        store.set(SessionKey::DetectedPlate, "ABC123").unwrap();

        assert_eq!(
            store.take(SessionKey::DetectedPlate).unwrap().as_deref(),
            Some("ABC123")
        );
        assert!(store.get(SessionKey::DetectedPlate).is_none());
        assert!(store.take(SessionKey::DetectedPlate).unwrap().is_none());
    }
}
