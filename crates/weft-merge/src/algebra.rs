//! The pure merge rules.

use std::collections::BTreeMap;

use weft_types::{Key, Node, Payload, Value};

/// Merge two values, resolving divergent child keys through `resolve`.
///
/// The rules, in order:
///
/// 1. Structurally equal values merge to the left argument.
/// 2. Blobs merge only when their bytes are equal; differing blobs conflict.
/// 3. Nodes merge label-wise: children present on one side are kept,
///    identical children are kept, divergent children go through `resolve`.
///    A `None` from the resolver aborts the whole merge.
/// 4. A blob against a node conflicts.
///
/// A merged node carries the predecessor list `[a.key(), b.key()]` (sorted
/// before hashing), which makes the result's key independent of argument
/// order whenever the resolver is symmetric.
pub fn merge<R>(resolve: &mut R, a: &Value, b: &Value) -> Option<Value>
where
    R: FnMut(&Key, &Key) -> Option<Key>,
{
    if a == b {
        return Some(a.clone());
    }

    match (a.payload(), b.payload()) {
        (Payload::Blob(left), Payload::Blob(right)) => {
            if left == right {
                Some(a.clone())
            } else {
                None
            }
        }
        (Payload::Node(left), Payload::Node(right)) => {
            let node = merge_nodes(resolve, left, right)?;
            Some(Value::with_predecessors(
                Payload::Node(node),
                vec![a.key(), b.key()],
            ))
        }
        _ => None,
    }
}

fn merge_nodes<R>(resolve: &mut R, left: &Node, right: &Node) -> Option<Node>
where
    R: FnMut(&Key, &Key) -> Option<Key>,
{
    let mut merged: BTreeMap<&str, Key> = BTreeMap::new();
    for (label, key) in &left.entries {
        merged.insert(label.as_str(), *key);
    }
    for (label, key) in &right.entries {
        match merged.get(label.as_str()).copied() {
            None => {
                merged.insert(label.as_str(), *key);
            }
            Some(existing) if existing == *key => {}
            Some(existing) => {
                let resolved = resolve(&existing, key)?;
                merged.insert(label.as_str(), resolved);
            }
        }
    }

    let content = match (&left.content, &right.content) {
        (None, None) => None,
        (Some(c), None) | (None, Some(c)) => Some(c.clone()),
        (Some(l), Some(r)) if l == r => Some(l.clone()),
        // Divergent inline bytes have no sub-key to resolve through.
        (Some(_), Some(_)) => return None,
    };

    let entries = merged
        .into_iter()
        .map(|(label, key)| (label.to_string(), key))
        .collect();
    Some(Node { entries, content })
}
