//! File-backed draft store: one JSON file per session key.
//!
//! Used by the terminal runner so an interrupted session resumes on the
//! next invocation. Keys are sanitized into filenames; the directory is
//! created on first write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::traits::DraftStore;

#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are "<form id>.<token prefix>"; anything outside a safe
        // filename alphabet becomes '_'.
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", name))
    }

    fn io_err(key: &str, e: std::io::Error) -> StorageError {
        StorageError::Io {
            key: key.to_owned(),
            message: e.to_string(),
        }
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_err(key, e)),
        }
    }

    fn save(&mut self, key: &str, draft_json: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| Self::io_err(key, e))?;
        std::fs::write(self.path_for(key), draft_json).map_err(|e| Self::io_err(key, e))
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_err(key, e)),
        }
    }
}

impl AsRef<Path> for FileDraftStore {
    fn as_ref(&self) -> &Path {
        &self.dir
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileDraftStore::new(dir.path().join("drafts"));

        assert_eq!(store.load("form.tok1").unwrap(), None);
        store.save("form.tok1", "{\"cursor\":1}").unwrap();
        assert_eq!(
            store.load("form.tok1").unwrap().as_deref(),
            Some("{\"cursor\":1}")
        );

        store.delete("form.tok1").unwrap();
        assert_eq!(store.load("form.tok1").unwrap(), None);
        store.delete("form.tok1").unwrap();
    }

    #[test]
    fn keys_are_sanitized_into_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileDraftStore::new(dir.path());

        store.save("../../escape?.tok", "{}").unwrap();
        // The write landed inside the store directory, not outside it.
        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![".._.._escape_.tok.json".to_string()]);
        assert_eq!(store.load("../../escape?.tok").unwrap().as_deref(), Some("{}"));
    }
}
