use async_trait::async_trait;

use weft_types::Key;

use crate::error::GraphResult;

/// Append-only DAG of keys.
///
/// Implementations must satisfy:
/// - Vertex and edge insertion is idempotent; nothing is ever removed.
/// - Both endpoints of every edge are vertices (`add_relation` inserts
///   missing endpoints).
/// - `predecessors` and `successors` are symmetric:
///   `p ∈ predecessors(k)` iff `k ∈ successors(p)`.
/// - Queries about unknown keys return empty lists, not errors.
#[async_trait]
pub trait KeyGraphStore: Send + Sync {
    /// Insert a vertex. A no-op if already present.
    async fn add_key(&self, key: Key) -> GraphResult<()>;

    /// Insert the edge `pred → succ`, inserting either endpoint if absent.
    async fn add_relation(&self, pred: Key, succ: Key) -> GraphResult<()>;

    /// All vertices, in unspecified order.
    async fn list(&self) -> GraphResult<Vec<Key>>;

    /// Keys with an edge into `key`. Empty if `key` is unknown.
    async fn predecessors(&self, key: &Key) -> GraphResult<Vec<Key>>;

    /// Keys with an edge out of `key`. Empty if `key` is unknown.
    async fn successors(&self, key: &Key) -> GraphResult<Vec<Key>>;

    /// Check whether `key` is a vertex.
    async fn contains(&self, key: &Key) -> GraphResult<bool>;
}
