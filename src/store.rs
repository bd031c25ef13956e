//! Persistence collaborator for the command and moderation tables.
//!
//! A store holds one JSON object document. Reads load the whole document and
//! writes overwrite it; the tables never patch a document in place. Key order
//! is preserved so table iteration order survives a reload.

use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::error::StoreError;

/// A whole persisted document: key to record.
pub type Document = Map<String, Value>;

/// Whole-document load/save.
pub trait DocumentStore: Send + Sync {
    /// Load the current document. A store that has never been written loads
    /// as an empty document.
    fn load(&self) -> Result<Document, StoreError>;

    /// Replace the document. Either the new document is durable afterwards or
    /// the previous one is still intact.
    fn save(&self, doc: &Document) -> Result<(), StoreError>;
}

/// JSON file on local disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DocumentStore for JsonFileStore {
    fn load(&self) -> Result<Document, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file absent, starting empty");
                return Ok(Document::new());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Document::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, doc: &Document) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(doc)?;
        let tmp = self.temp_path();
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), keys = doc.len(), "store saved");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_directory_and_round_trips_in_order() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/commands.json"));

        let Value::Object(doc) = json!({"!zeta": ["z", "STATIC", "", ""], "!alpha": ["a", "STATIC", "", ""]})
        else {
            unreachable!()
        };
        store.save(&doc).unwrap();

        let loaded = store.load().unwrap();
        let keys: Vec<&String> = loaded.keys().collect();
        assert_eq!(keys, vec!["!zeta", "!alpha"]);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::new(path).load(),
            Err(StoreError::Json(_))
        ));
    }
}
