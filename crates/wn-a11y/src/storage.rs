//! Host key-value storage
//!
//! The auditor persists only its score history, through whatever generic
//! string store the host offers (browser local storage, a file, memory).

use std::collections::HashMap;

use crate::AuditError;

/// String key-value store supplied by the host
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuditError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), AuditError>;
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuditError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), AuditError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, AuditError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), AuditError> {
        (**self).set(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.get("k").unwrap().is_none());
        store.set("k", "v".into()).unwrap();
        store.set("k", "w".into()).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("w"));
        assert_eq!(store.len(), 1);
    }
}
