//! In-memory store

use std::collections::HashMap;
use std::sync::RwLock;

use super::SecureStore;
use crate::error::{Error, Result};

/// Volatile [`SecureStore`]. Nothing survives the process; not encrypted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut data) = store.data.write() {
            data.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl SecureStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let data = self
            .data
            .read()
            .map_err(|e| Error::Storage(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| Error::Storage(e.to_string()))?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| Error::Storage(e.to_string()))?;
        data.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("jwtoken", "abc123").unwrap();
        assert_eq!(store.get("jwtoken").unwrap().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_get_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(!store.contains("missing").unwrap());
    }

    #[test]
    fn test_delete_missing_succeeds() {
        let store = MemoryStore::new();
        assert!(store.delete("missing").is_ok());
    }

    #[test]
    fn test_with_entry() {
        let store = MemoryStore::with_entry("jwtoken", "xyz");
        assert!(store.contains("jwtoken").unwrap());
        store.delete("jwtoken").unwrap();
        assert!(!store.contains("jwtoken").unwrap());
    }
}
