//! Opaque key→value progress persistence backed by a JSON file.
//!
//! Values are opaque strings; callers that want structure encode it as
//! JSON themselves via `get_json`/`set_json`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from the progress store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// File-backed key→value store. Reads once on open, writes on `flush`.
pub struct ProgressStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
    dirty: bool,
}

impl ProgressStore {
    /// Open the store, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => return Err(error.into()),
        };
        Ok(Self {
            path,
            values,
            dirty: false,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
        self.dirty = true;
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.values.remove(key).is_some();
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Decode a stored value as JSON.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    /// Encode a value as JSON and store it under `key`.
    pub fn set_json<T: Serialize>(&mut self, key: impl Into<String>, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw);
        Ok(())
    }

    /// Write the store to disk if anything changed since the last flush.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;
        self.dirty = false;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_store_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("dictation-trainer-test-{}", std::process::id()))
            .join(name)
            .join("progress.json")
    }

    #[test]
    fn opens_empty_when_file_is_missing() {
        let store = ProgressStore::open(temp_store_path("missing")).unwrap();
        assert_eq!(store.get("star_data"), None);
    }

    #[test]
    fn values_round_trip_through_flush() {
        let path = temp_store_path("roundtrip");
        let _ = fs::remove_file(&path);

        let mut store = ProgressStore::open(&path).unwrap();
        store.set("star_data", r#"{"w1":3}"#);
        store.flush().unwrap();

        let reopened = ProgressStore::open(&path).unwrap();
        assert_eq!(reopened.get("star_data"), Some(r#"{"w1":3}"#));
    }

    #[test]
    fn json_helpers_encode_and_decode() {
        let mut store = ProgressStore::open(temp_store_path("json")).unwrap();
        store.set_json("counts", &vec![1, 2, 3]).unwrap();

        let decoded: Option<Vec<i32>> = store.get_json("counts").unwrap();
        assert_eq!(decoded, Some(vec![1, 2, 3]));

        let missing: Option<Vec<i32>> = store.get_json("absent").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn remove_reports_whether_key_existed() {
        let mut store = ProgressStore::open(temp_store_path("remove")).unwrap();
        store.set("k", "v");
        assert!(store.remove("k"));
        assert!(!store.remove("k"));
        assert_eq!(store.get("k"), None);
    }
}
