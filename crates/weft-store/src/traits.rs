use async_trait::async_trait;

use weft_types::{Key, Value};

use crate::error::StoreResult;

/// Content-addressed value store.
///
/// All implementations must satisfy these invariants:
/// - If a key is present, the stored value's canonical encoding hashes back
///   to that key (content addressing).
/// - Values are immutable and never removed; `write` is idempotent and
///   concurrent writers of the same value observe the same key.
/// - Absence is `Ok(None)`, never an error.
/// - I/O faults are propagated, never silently swallowed.
#[async_trait]
pub trait ValueStore: Send + Sync {
    /// Write a value and return its content-addressed key.
    ///
    /// A no-op if the value is already present.
    async fn write(&self, value: &Value) -> StoreResult<Key>;

    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored there. Backends verify
    /// content addressing on the way out and fail with
    /// [`StoreError::Integrity`](crate::StoreError::Integrity) on mismatch.
    async fn read(&self, key: &Key) -> StoreResult<Option<Value>>;

    /// Check whether `key` is present without fetching the value.
    async fn contains(&self, key: &Key) -> StoreResult<bool>;
}
