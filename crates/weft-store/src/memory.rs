use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use weft_types::{Key, Value, WireEncode};

use crate::error::{StoreError, StoreResult};
use crate::traits::ValueStore;

/// In-memory, HashMap-based value store.
///
/// The reference backend: all values live behind a single `RwLock`. Reads
/// clone the stored value; content addressing makes that safe under any
/// interleaving.
pub struct MemoryValueStore {
    values: RwLock<HashMap<Key, Value>>,
}

impl MemoryValueStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Number of values currently stored.
    pub fn len(&self) -> usize {
        self.values.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.values.read().expect("lock poisoned").is_empty()
    }

    /// All stored keys, sorted.
    pub fn all_keys(&self) -> Vec<Key> {
        let map = self.values.read().expect("lock poisoned");
        let mut keys: Vec<Key> = map.keys().copied().collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValueStore for MemoryValueStore {
    async fn write(&self, value: &Value) -> StoreResult<Key> {
        let key = value.key();
        let mut map = self.values.write().expect("lock poisoned");
        // Idempotent: content addressing guarantees an existing entry
        // under this key holds the same value.
        if !map.contains_key(&key) {
            debug!(key = %key.short_hex(), "stored value");
            map.insert(key, value.clone());
        }
        Ok(key)
    }

    async fn read(&self, key: &Key) -> StoreResult<Option<Value>> {
        let value = {
            let map = self.values.read().expect("lock poisoned");
            map.get(key).cloned()
        };
        let Some(value) = value else {
            return Ok(None);
        };
        // Re-derive the key from the canonical bytes rather than trusting
        // the cached digest: a backend swap or bit rot must surface here.
        let computed = Key::of_bytes(&value.encode());
        if computed != *key {
            return Err(StoreError::Integrity {
                key: *key,
                computed,
            });
        }
        Ok(Some(value))
    }

    async fn contains(&self, key: &Key) -> StoreResult<bool> {
        let map = self.values.read().expect("lock poisoned");
        Ok(map.contains_key(key))
    }
}

impl std::fmt::Debug for MemoryValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryValueStore")
            .field("value_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_and_read_roundtrip() {
        let store = MemoryValueStore::new();
        let value = Value::blob(b"hello".to_vec());
        let key = store.write(&value).await.unwrap();
        assert_eq!(key, value.key());

        let read_back = store.read(&key).await.unwrap().expect("should exist");
        assert_eq!(read_back, value);
    }

    #[tokio::test]
    async fn read_missing_returns_none() {
        let store = MemoryValueStore::new();
        let key = Key::of_bytes(b"missing");
        assert!(store.read(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_is_idempotent() {
        let store = MemoryValueStore::new();
        let value = Value::blob(b"once".to_vec());
        let k1 = store.write(&value).await.unwrap();
        let k2 = store.write(&value).await.unwrap();
        assert_eq!(k1, k2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn identical_content_deduplicates() {
        let store = MemoryValueStore::new();
        let k1 = store.write(&Value::blob(b"same".to_vec())).await.unwrap();
        let k2 = store.write(&Value::blob(b"same".to_vec())).await.unwrap();
        assert_eq!(k1, k2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn different_content_gets_different_keys() {
        let store = MemoryValueStore::new();
        let k1 = store.write(&Value::blob(b"aaa".to_vec())).await.unwrap();
        let k2 = store.write(&Value::blob(b"bbb".to_vec())).await.unwrap();
        assert_ne!(k1, k2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn contains_tracks_presence() {
        let store = MemoryValueStore::new();
        let value = Value::blob(b"present".to_vec());
        assert!(!store.contains(&value.key()).await.unwrap());
        store.write(&value).await.unwrap();
        assert!(store.contains(&value.key()).await.unwrap());
    }

    #[tokio::test]
    async fn node_values_store_like_blobs() {
        let store = MemoryValueStore::new();
        let child = store.write(&Value::blob(b"child".to_vec())).await.unwrap();
        let node = Value::node(vec![("c".to_string(), child)]);
        let key = store.write(&node).await.unwrap();

        let read_back = store.read(&key).await.unwrap().unwrap();
        assert!(read_back.is_node());
        assert_eq!(read_back.predecessors(), &[child]);
    }

    #[tokio::test]
    async fn all_keys_is_sorted() {
        let store = MemoryValueStore::new();
        for content in [b"a".as_slice(), b"b", b"c"] {
            store.write(&Value::blob(content.to_vec())).await.unwrap();
        }
        let keys = store.all_keys();
        assert_eq!(keys.len(), 3);
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn concurrent_writers_agree_on_key() {
        use std::sync::Arc;

        let store = Arc::new(MemoryValueStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.write(&Value::blob(b"raced".to_vec())).await.unwrap()
            }));
        }
        let mut keys = Vec::new();
        for handle in handles {
            keys.push(handle.await.unwrap());
        }
        keys.dedup();
        assert_eq!(keys.len(), 1);
        assert_eq!(store.len(), 1);
    }
}
