use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::SubmissionRecord;

/// A durable per-device key→JSON-string store for session drafts.
///
/// The engine writes eagerly after every answer mutation and cursor
/// change, reads once at session start, and deletes on successful
/// submission. Implementations need no locking: a store instance is
/// owned by exactly one session.
///
/// The reference deployment backs this with browser local storage; any
/// durable key-value store satisfies the contract.
pub trait DraftStore {
    /// Read the draft JSON for a key. `Ok(None)` when no draft exists.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (or overwrite) the draft JSON for a key.
    fn save(&mut self, key: &str, draft_json: &str) -> Result<(), StorageError>;

    /// Remove the draft for a key. Removing a nonexistent key is not an
    /// error.
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;
}

/// A mutable borrow of a store is itself a store, so a host can keep
/// ownership across several sessions (e.g. resume after restart).
impl<T: DraftStore + ?Sized> DraftStore for &mut T {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&mut self, key: &str, draft_json: &str) -> Result<(), StorageError> {
        (**self).save(key, draft_json)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}

/// Server-side store of accepted submissions.
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait SubmissionStore: Send + Sync + 'static {
    /// Append an accepted submission record.
    async fn append(&self, record: SubmissionRecord) -> Result<(), StorageError>;

    /// All stored records for a form, in acceptance order.
    async fn list(&self, form_id: &str) -> Result<Vec<SubmissionRecord>, StorageError>;
}
