/// All errors that can be returned by a draft or submission store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The underlying store could not be read or written.
    #[error("draft store I/O error for key '{key}': {message}")]
    Io { key: String, message: String },

    /// A stored draft could not be deserialized. Callers resuming a
    /// session treat this as "no draft" rather than a fatal error.
    #[error("corrupt draft for key '{key}': {message}")]
    Corrupt { key: String, message: String },

    /// A backend-specific storage error (serialization, lock poisoning, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
