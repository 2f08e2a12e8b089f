use weft_types::Key;

/// Errors from value store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The value found under a key does not hash back to that key.
    ///
    /// This indicates storage corruption and is fatal for the backend.
    #[error("integrity violation for {key}: stored value hashes to {computed}")]
    Integrity { key: Key, computed: Key },

    /// I/O error from the underlying storage backend.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure in a composite backend layered over this store.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for value store operations.
pub type StoreResult<T> = Result<T, StoreError>;
