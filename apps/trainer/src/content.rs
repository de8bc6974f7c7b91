//! Unit content loading from the data directory.

use drill_core::{UnitData, UnitIndex};
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Index file name inside the data directory.
pub const UNITS_INDEX: &str = "units-index.json";

/// Unit opened when none is requested.
pub const DEFAULT_UNIT: &str = "unit1";

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("unit {0} not found")]
    UnitNotFound(String),

    #[error("content I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("content parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ContentError>;

/// Reads unit content files from one data directory.
pub struct ContentLibrary {
    data_dir: PathBuf,
}

impl ContentLibrary {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn index(&self) -> Result<UnitIndex> {
        self.read_json(&self.data_dir.join(UNITS_INDEX))
    }

    pub fn unit(&self, unit_id: &str) -> Result<UnitData> {
        let path = self.data_dir.join(format!("{unit_id}.json"));
        if !path.is_file() {
            return Err(ContentError::UnitNotFound(unit_id.to_string()));
        }
        self.read_json(&path)
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|source| ContentError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_data_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("dictation-content-test-{}", std::process::id()))
            .join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn loads_index_and_unit() {
        let dir = temp_data_dir("loads");
        fs::write(
            dir.join(UNITS_INDEX),
            r#"{"units": [{"id": "unit1", "title": "Unit One"}]}"#,
        )
        .unwrap();
        fs::write(
            dir.join("unit1.json"),
            r#"{"unit_title": "Unit One", "words": [], "sentences": []}"#,
        )
        .unwrap();

        let library = ContentLibrary::new(&dir);
        let index = library.index().unwrap();
        assert_eq!(index.units.len(), 1);
        assert_eq!(index.units[0].id, "unit1");

        let unit = library.unit("unit1").unwrap();
        assert_eq!(unit.unit_title.as_deref(), Some("Unit One"));
    }

    #[test]
    fn missing_unit_is_reported_as_not_found() {
        let dir = temp_data_dir("missing");
        let library = ContentLibrary::new(&dir);
        match library.unit("nope") {
            Err(ContentError::UnitNotFound(id)) => assert_eq!(id, "nope"),
            other => panic!("expected UnitNotFound, got {other:?}"),
        }
    }

    #[test]
    fn malformed_unit_reports_parse_error_with_path() {
        let dir = temp_data_dir("malformed");
        fs::write(dir.join("bad.json"), "not json").unwrap();

        let library = ContentLibrary::new(&dir);
        match library.unit("bad") {
            Err(ContentError::Parse { path, .. }) => {
                assert!(path.ends_with("bad.json"));
            }
            other => panic!("expected Parse, got {other:?}"),
        }
    }
}
