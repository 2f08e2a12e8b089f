use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use weft_types::Key;

use crate::error::GraphResult;
use crate::traits::KeyGraphStore;

/// In-memory key graph.
///
/// Maintains both edge directions so predecessor and successor queries are
/// each a single map lookup. `BTreeSet` adjacency keeps query results in a
/// deterministic order.
#[derive(Default)]
pub struct MemoryKeyGraph {
    inner: RwLock<Adjacency>,
}

#[derive(Default)]
struct Adjacency {
    /// Vertex → keys with an edge *into* it.
    preds: HashMap<Key, BTreeSet<Key>>,
    /// Vertex → keys with an edge *out of* it.
    succs: HashMap<Key, BTreeSet<Key>>,
}

impl Adjacency {
    fn ensure_vertex(&mut self, key: Key) -> bool {
        let fresh = !self.preds.contains_key(&key);
        self.preds.entry(key).or_default();
        self.succs.entry(key).or_default();
        fresh
    }
}

impl MemoryKeyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").preds.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        let inner = self.inner.read().expect("lock poisoned");
        inner.preds.values().map(BTreeSet::len).sum()
    }
}

#[async_trait]
impl KeyGraphStore for MemoryKeyGraph {
    async fn add_key(&self, key: Key) -> GraphResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        if inner.ensure_vertex(key) {
            debug!(key = %key.short_hex(), "added graph vertex");
        }
        Ok(())
    }

    async fn add_relation(&self, pred: Key, succ: Key) -> GraphResult<()> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.ensure_vertex(pred);
        inner.ensure_vertex(succ);
        let fresh = inner.preds.get_mut(&succ).expect("vertex present").insert(pred);
        inner.succs.get_mut(&pred).expect("vertex present").insert(succ);
        if fresh {
            debug!(
                pred = %pred.short_hex(),
                succ = %succ.short_hex(),
                "added graph edge"
            );
        }
        Ok(())
    }

    async fn list(&self) -> GraphResult<Vec<Key>> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner.preds.keys().copied().collect())
    }

    async fn predecessors(&self, key: &Key) -> GraphResult<Vec<Key>> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner
            .preds
            .get(key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn successors(&self, key: &Key) -> GraphResult<Vec<Key>> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner
            .succs
            .get(key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn contains(&self, key: &Key) -> GraphResult<bool> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner.preds.contains_key(key))
    }
}

impl std::fmt::Debug for MemoryKeyGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryKeyGraph")
            .field("vertex_count", &self.vertex_count())
            .field("edge_count", &self.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Key {
        Key::from_digest([byte; 20])
    }

    #[tokio::test]
    async fn add_key_is_idempotent() {
        let graph = MemoryKeyGraph::new();
        graph.add_key(key(1)).await.unwrap();
        graph.add_key(key(1)).await.unwrap();
        assert_eq!(graph.vertex_count(), 1);
        assert!(graph.contains(&key(1)).await.unwrap());
    }

    #[tokio::test]
    async fn add_relation_inserts_endpoints() {
        let graph = MemoryKeyGraph::new();
        graph.add_relation(key(1), key(2)).await.unwrap();
        assert_eq!(graph.vertex_count(), 2);
        assert!(graph.contains(&key(1)).await.unwrap());
        assert!(graph.contains(&key(2)).await.unwrap());
    }

    #[tokio::test]
    async fn add_relation_is_idempotent() {
        let graph = MemoryKeyGraph::new();
        graph.add_relation(key(1), key(2)).await.unwrap();
        graph.add_relation(key(1), key(2)).await.unwrap();
        assert_eq!(graph.edge_count(), 1);
    }

    #[tokio::test]
    async fn predecessors_and_successors_are_symmetric() {
        let graph = MemoryKeyGraph::new();
        graph.add_relation(key(1), key(2)).await.unwrap();
        graph.add_relation(key(3), key(2)).await.unwrap();

        assert_eq!(
            graph.predecessors(&key(2)).await.unwrap(),
            vec![key(1), key(3)]
        );
        assert_eq!(graph.successors(&key(1)).await.unwrap(), vec![key(2)]);
        assert_eq!(graph.successors(&key(3)).await.unwrap(), vec![key(2)]);
        assert!(graph.predecessors(&key(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_keys_yield_empty_lists() {
        let graph = MemoryKeyGraph::new();
        assert!(graph.predecessors(&key(9)).await.unwrap().is_empty());
        assert!(graph.successors(&key(9)).await.unwrap().is_empty());
        assert!(!graph.contains(&key(9)).await.unwrap());
    }

    #[tokio::test]
    async fn list_returns_all_vertices() {
        let graph = MemoryKeyGraph::new();
        graph.add_key(key(1)).await.unwrap();
        graph.add_relation(key(2), key(3)).await.unwrap();

        let mut vertices = graph.list().await.unwrap();
        vertices.sort();
        assert_eq!(vertices, vec![key(1), key(2), key(3)]);
    }

    #[tokio::test]
    async fn diamond_shape() {
        //   1
        //  / \
        // 2   3
        //  \ /
        //   4
        let graph = MemoryKeyGraph::new();
        graph.add_relation(key(1), key(2)).await.unwrap();
        graph.add_relation(key(1), key(3)).await.unwrap();
        graph.add_relation(key(2), key(4)).await.unwrap();
        graph.add_relation(key(3), key(4)).await.unwrap();

        assert_eq!(
            graph.predecessors(&key(4)).await.unwrap(),
            vec![key(2), key(3)]
        );
        assert_eq!(
            graph.successors(&key(1)).await.unwrap(),
            vec![key(2), key(3)]
        );
        assert_eq!(graph.edge_count(), 4);
    }
}
