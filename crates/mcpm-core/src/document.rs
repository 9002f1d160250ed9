//! JSON document read/write helpers shared by the stores.
//!
//! Writes go through a temp file in the destination directory followed by a
//! rename, so a crash never leaves a half written record or target config.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Result, StoreError};

/// Read and deserialize a JSON document.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    tracing::debug!(path = %path.display(), "reading document");
    let bytes = std::fs::read(path).map_err(|e| StoreError::file(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::format(path, e))
}

/// Serialize and atomically write a JSON document, creating parent
/// directories as needed.
pub fn save_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|e| StoreError::format(path, e))?;
    bytes.push(b'\n');
    write_atomic(path, &bytes)
}

/// Load a JSON object, treating a missing file as empty.
pub fn load_json_map(path: &Path) -> Result<Map<String, Value>> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let value: Value = load_document(path)?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::format(
            path,
            serde::de::Error::custom("expected a JSON object at the document root"),
        )),
    }
}

/// Write `bytes` to `path` through a temp file in the same directory.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| StoreError::file(parent, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| StoreError::file(parent, e))?;
    if let Err(e) = tmp.write_all(bytes) {
        return Err(StoreError::file(tmp.path(), e));
    }
    tmp.persist(path).map_err(|e| StoreError::file(path, e.error))?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn save_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("doc.json");

        save_document(&path, &serde_json::json!({"a": 1})).unwrap();

        let loaded: Value = load_document(&path).unwrap();
        assert_eq!(loaded["a"], 1);
    }

    #[test]
    fn load_missing_is_file_error() {
        let temp = TempDir::new().unwrap();
        let err = load_document::<Value>(&temp.path().join("nope.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::File);
    }

    #[test]
    fn load_malformed_is_format_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = load_document::<Value>(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn json_map_requires_object_root() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("array.json");
        std::fs::write(&path, "[1, 2]").unwrap();

        assert_eq!(load_json_map(&path).unwrap_err().kind(), ErrorKind::Format);
        assert!(load_json_map(&temp.path().join("missing.json")).unwrap().is_empty());
    }

    #[test]
    fn save_leaves_no_temp_files_behind() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        save_document(&path, &serde_json::json!({})).unwrap();
        save_document(&path, &serde_json::json!({"b": true})).unwrap();

        let entries: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
