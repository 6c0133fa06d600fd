//! In-memory store implementations, for tests and ephemeral sessions.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::StorageError;
use crate::record::SubmissionRecord;
use crate::traits::{DraftStore, SubmissionStore};

/// HashMap-backed draft store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: HashMap<String, String>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DraftStore for MemoryDraftStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, draft_json: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), draft_json.to_owned());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// In-memory submission store behind an async mutex.
#[derive(Debug, Default)]
pub struct MemorySubmissionStore {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl MemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubmissionStore for MemorySubmissionStore {
    async fn append(&self, record: SubmissionRecord) -> Result<(), StorageError> {
        self.records.lock().await.push(record);
        Ok(())
    }

    async fn list(&self, form_id: &str) -> Result<Vec<SubmissionRecord>, StorageError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.form_id == form_id)
            .cloned()
            .collect())
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_store_round_trip() {
        let mut store = MemoryDraftStore::new();
        assert_eq!(store.load("k").unwrap(), None);

        store.save("k", "{\"answers\":{},\"cursor\":0}").unwrap();
        assert_eq!(
            store.load("k").unwrap().as_deref(),
            Some("{\"answers\":{},\"cursor\":0}")
        );

        store.delete("k").unwrap();
        assert_eq!(store.load("k").unwrap(), None);
        // Deleting again is not an error.
        store.delete("k").unwrap();
    }

    #[tokio::test]
    async fn submission_store_filters_by_form() {
        let store = MemorySubmissionStore::new();
        let record = |id: &str, form: &str| SubmissionRecord {
            record_id: id.to_string(),
            form_id: form.to_string(),
            answers: serde_json::json!({}),
            submitted_at: time::OffsetDateTime::UNIX_EPOCH,
        };

        store.append(record("r1", "a")).await.unwrap();
        store.append(record("r2", "b")).await.unwrap();
        store.append(record("r3", "a")).await.unwrap();

        let for_a = store.list("a").await.unwrap();
        assert_eq!(
            for_a.iter().map(|r| r.record_id.as_str()).collect::<Vec<_>>(),
            vec!["r1", "r3"]
        );
        assert!(store.list("missing").await.unwrap().is_empty());
    }
}
