//! JSON file store for the score history

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use wn_a11y::{AuditError, KeyValueStore};

/// Key-value store kept as one JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`; a missing, empty or corrupt file starts empty and is
    /// rewritten on the next `set`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding corrupt history file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(storage_error(&path, e)),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, AuditError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), AuditError> {
        self.entries.insert(key.to_string(), value);
        let raw = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, raw).map_err(|e| storage_error(&self.path, e))
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> AuditError {
    AuditError::Storage(format!("{}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_empty_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("wn_audit_history").unwrap().is_none());

        store.set("wn_audit_history", "[]".into()).unwrap();
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get("wn_audit_history").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_corrupt_file_is_discarded_and_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("wn_audit_history").unwrap().is_none());

        store.set("wn_audit_history", "[]".into()).unwrap();
        let raw: BTreeMap<String, String> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("wn_audit_history").map(String::as_str), Some("[]"));
    }
}
