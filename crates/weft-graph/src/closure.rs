//! Ancestry traversals over a [`KeyGraphStore`].
//!
//! Pull and watch are both built on one computation: the set of vertices
//! reachable from a set of *sink* keys by following predecessor edges,
//! cut at a set of *root* keys. Roots and their ancestors are excluded:
//! they are what the requesting side already has.

use std::collections::{HashSet, VecDeque};

use weft_types::{Graph, Key};

use crate::error::{GraphError, GraphResult};
use crate::traits::KeyGraphStore;

/// Compute the predecessor closure of `sinks`, cut at `roots`.
///
/// Returns the subgraph containing every vertex reachable from a sink via
/// predecessor edges without passing through a root, together with all
/// edges of the underlying graph whose endpoints both land in that set.
/// With empty `roots` this is the full ancestry of the sinks.
///
/// The traversal is a reverse BFS with a visited set; it fails with
/// [`GraphError::ClosureCapExceeded`] once more than `max_vertices`
/// vertices have been collected. The result is normalized (sorted,
/// deduplicated) so equal closures compare equal.
pub async fn ancestry_closure(
    graph: &dyn KeyGraphStore,
    sinks: &[Key],
    roots: &[Key],
    max_vertices: usize,
) -> GraphResult<Graph> {
    let cut: HashSet<Key> = roots.iter().copied().collect();

    let mut visited: HashSet<Key> = HashSet::new();
    let mut queue: VecDeque<Key> = VecDeque::new();
    for sink in sinks {
        if !cut.contains(sink) && visited.insert(*sink) {
            queue.push_back(*sink);
        }
    }

    let mut result = Graph::new();
    while let Some(current) = queue.pop_front() {
        if result.vertices.len() >= max_vertices {
            return Err(GraphError::ClosureCapExceeded {
                limit: max_vertices,
            });
        }
        result.vertices.push(current);

        for pred in graph.predecessors(&current).await? {
            if cut.contains(&pred) {
                continue;
            }
            // Every in-edge whose source survives the cut is induced:
            // the source joins the vertex set right here.
            result.edges.push((pred, current));
            if visited.insert(pred) {
                queue.push_back(pred);
            }
        }
    }

    result.normalize();
    Ok(result)
}

/// The graph a tag move makes newly reachable.
///
/// `current` is the tag's new key, `previous` its old one (if any): the
/// delta is the ancestry of the new key cut at the old one. A removed tag
/// has no new tip, so its delta is empty.
pub async fn tag_delta(
    graph: &dyn KeyGraphStore,
    current: Option<Key>,
    previous: Option<Key>,
    max_vertices: usize,
) -> GraphResult<Graph> {
    let Some(current) = current else {
        return Ok(Graph::new());
    };
    let roots: Vec<Key> = previous.into_iter().collect();
    ancestry_closure(graph, &[current], &roots, max_vertices).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKeyGraph;

    fn key(byte: u8) -> Key {
        Key::from_digest([byte; 20])
    }

    /// k1 ← k2 ← k3 (edges point predecessor → successor).
    async fn chain() -> MemoryKeyGraph {
        let graph = MemoryKeyGraph::new();
        graph.add_relation(key(1), key(2)).await.unwrap();
        graph.add_relation(key(2), key(3)).await.unwrap();
        graph
    }

    #[tokio::test]
    async fn full_closure_of_a_chain() {
        let graph = chain().await;
        let closure = ancestry_closure(&graph, &[key(3)], &[], 1000)
            .await
            .unwrap();
        assert_eq!(closure.vertices, vec![key(1), key(2), key(3)]);
        assert_eq!(closure.edges, vec![(key(1), key(2)), (key(2), key(3))]);
        assert!(closure.is_well_formed());
    }

    #[tokio::test]
    async fn roots_cut_the_closure() {
        let graph = chain().await;
        let closure = ancestry_closure(&graph, &[key(3)], &[key(1)], 1000)
            .await
            .unwrap();
        assert_eq!(closure.vertices, vec![key(2), key(3)]);
        assert_eq!(closure.edges, vec![(key(2), key(3))]);
    }

    #[tokio::test]
    async fn sink_equal_to_root_yields_empty() {
        let graph = chain().await;
        let closure = ancestry_closure(&graph, &[key(3)], &[key(3)], 1000)
            .await
            .unwrap();
        assert!(closure.is_empty());
    }

    #[tokio::test]
    async fn unknown_sink_is_a_lone_vertex() {
        let graph = MemoryKeyGraph::new();
        let closure = ancestry_closure(&graph, &[key(7)], &[], 1000)
            .await
            .unwrap();
        assert_eq!(closure.vertices, vec![key(7)]);
        assert!(closure.edges.is_empty());
    }

    #[tokio::test]
    async fn diamond_closure_includes_both_arms() {
        let graph = MemoryKeyGraph::new();
        graph.add_relation(key(1), key(2)).await.unwrap();
        graph.add_relation(key(1), key(3)).await.unwrap();
        graph.add_relation(key(2), key(4)).await.unwrap();
        graph.add_relation(key(3), key(4)).await.unwrap();

        let closure = ancestry_closure(&graph, &[key(4)], &[], 1000)
            .await
            .unwrap();
        assert_eq!(closure.vertices, vec![key(1), key(2), key(3), key(4)]);
        assert_eq!(closure.edge_count(), 4);
    }

    #[tokio::test]
    async fn diamond_cut_at_shared_ancestor() {
        let graph = MemoryKeyGraph::new();
        graph.add_relation(key(1), key(2)).await.unwrap();
        graph.add_relation(key(1), key(3)).await.unwrap();
        graph.add_relation(key(2), key(4)).await.unwrap();
        graph.add_relation(key(3), key(4)).await.unwrap();

        let closure = ancestry_closure(&graph, &[key(4)], &[key(1)], 1000)
            .await
            .unwrap();
        assert_eq!(closure.vertices, vec![key(2), key(3), key(4)]);
        // The 1→2 and 1→3 edges fall away with the cut vertex.
        assert_eq!(closure.edges, vec![(key(2), key(4)), (key(3), key(4))]);
    }

    #[tokio::test]
    async fn multiple_sinks_union() {
        let graph = MemoryKeyGraph::new();
        graph.add_relation(key(1), key(2)).await.unwrap();
        graph.add_relation(key(3), key(4)).await.unwrap();

        let closure = ancestry_closure(&graph, &[key(2), key(4)], &[], 1000)
            .await
            .unwrap();
        assert_eq!(closure.vertices, vec![key(1), key(2), key(3), key(4)]);
    }

    #[tokio::test]
    async fn cap_is_enforced() {
        let graph = chain().await;
        let err = ancestry_closure(&graph, &[key(3)], &[], 2)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::ClosureCapExceeded { limit: 2 }
        ));
    }

    #[tokio::test]
    async fn tag_delta_for_fresh_tag_is_full_ancestry() {
        let graph = chain().await;
        let delta = tag_delta(&graph, Some(key(3)), None, 1000).await.unwrap();
        assert_eq!(delta.vertex_count(), 3);
    }

    #[tokio::test]
    async fn tag_delta_cuts_at_previous_tip() {
        let graph = chain().await;
        let delta = tag_delta(&graph, Some(key(3)), Some(key(2)), 1000)
            .await
            .unwrap();
        assert_eq!(delta.vertices, vec![key(3)]);
        assert!(delta.edges.is_empty());
    }

    #[tokio::test]
    async fn tag_delta_for_removal_is_empty() {
        let graph = chain().await;
        let delta = tag_delta(&graph, None, Some(key(3)), 1000).await.unwrap();
        assert!(delta.is_empty());
    }
}
