use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use weft_graph::{KeyGraphStore, MemoryKeyGraph};
use weft_merge::StoreMerger;
use weft_refs::{MemoryTagStore, TagStore};
use weft_store::{MemoryValueStore, StoreResult, ValueStore};
use weft_types::{Key, Tag, Value};

use crate::error::DbResult;

/// The three stores behind one handle.
///
/// `commit` is the write path that keeps the stores coherent: the value
/// lands in the value store and its key and predecessor edges land in the
/// graph. Reads and tag operations pass straight through. Clones share the
/// underlying stores.
#[derive(Clone)]
pub struct Database {
    values: Arc<dyn ValueStore>,
    graph: Arc<dyn KeyGraphStore>,
    tags: Arc<dyn TagStore>,
}

impl Database {
    /// A database over explicit store backends.
    pub fn new(
        values: Arc<dyn ValueStore>,
        graph: Arc<dyn KeyGraphStore>,
        tags: Arc<dyn TagStore>,
    ) -> Self {
        Self {
            values,
            graph,
            tags,
        }
    }

    /// A database over the in-memory reference backends.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryValueStore::new()),
            Arc::new(MemoryKeyGraph::new()),
            Arc::new(MemoryTagStore::new()),
        )
    }

    /// The value store.
    pub fn values(&self) -> &Arc<dyn ValueStore> {
        &self.values
    }

    /// The key graph store.
    pub fn graph(&self) -> &Arc<dyn KeyGraphStore> {
        &self.graph
    }

    /// The tag store.
    pub fn tags(&self) -> &Arc<dyn TagStore> {
        &self.tags
    }

    /// Write a value and register its shape in the key graph.
    ///
    /// Idempotent, like the stores underneath.
    pub async fn commit(&self, value: &Value) -> DbResult<Key> {
        let key = self.values.write(value).await?;
        self.graph.add_key(key).await?;
        for pred in value.predecessors() {
            self.graph.add_relation(*pred, key).await?;
        }
        debug!(key = %key.short_hex(), preds = value.predecessors().len(), "committed value");
        Ok(key)
    }

    /// Read a value by key.
    pub async fn checkout(&self, key: &Key) -> DbResult<Option<Value>> {
        Ok(self.values.read(key).await?)
    }

    /// Merge the values two tags point at, committing the result and
    /// advancing `into`.
    ///
    /// Returns the merged key, or `None` when either tag is missing or the
    /// merge conflicts. Divergent children are merged recursively through
    /// this database, so merged intermediates are committed (and graphed)
    /// too.
    pub async fn merge_tags(&self, into: &Tag, from: &Tag) -> DbResult<Option<Key>> {
        let (Some(ours), Some(theirs)) =
            (self.tags.read(into).await?, self.tags.read(from).await?)
        else {
            return Ok(None);
        };
        let merger = StoreMerger::new(self);
        let Some(merged) = merger.merge_keys(ours, theirs).await? else {
            return Ok(None);
        };
        self.tags.update(into, merged).await?;
        Ok(Some(merged))
    }
}

// Standing in as a plain value store routes every write through `commit`,
// which is what keeps recursively merged intermediates in the graph.
#[async_trait]
impl ValueStore for Database {
    async fn write(&self, value: &Value) -> StoreResult<Key> {
        self.commit(value).await.map_err(Into::into)
    }

    async fn read(&self, key: &Key) -> StoreResult<Option<Value>> {
        self.values.read(key).await
    }

    async fn contains(&self, key: &Key) -> StoreResult<bool> {
        self.values.contains(key).await
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}
