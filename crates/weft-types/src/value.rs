use std::fmt;
use std::sync::OnceLock;

use crate::encode::WireEncode;
use crate::key::Key;

/// The payload carried by a [`Value`]: raw bytes, or a structured node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Opaque content.
    Blob(Vec<u8>),
    /// An ordered listing of labeled child keys.
    Node(Node),
}

impl Payload {
    /// Returns `true` for blob payloads.
    pub fn is_blob(&self) -> bool {
        matches!(self, Payload::Blob(_))
    }

    /// Returns `true` for node payloads.
    pub fn is_node(&self) -> bool {
        matches!(self, Payload::Node(_))
    }
}

/// A structured payload: labeled child pointers plus optional inline content.
///
/// Entries are kept sorted by label so the canonical encoding (and therefore
/// the derived key) is independent of insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    /// `(label, key)` pairs, sorted by label.
    pub entries: Vec<(String, Key)>,
    /// Optional inline content alongside the children.
    pub content: Option<Vec<u8>>,
}

impl Node {
    /// Create a node, sorting entries by label.
    pub fn new(mut entries: Vec<(String, Key)>) -> Self {
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Self {
            entries,
            content: None,
        }
    }

    /// Look up the child key under `label`.
    pub fn get(&self, label: &str) -> Option<Key> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, k)| *k)
    }

    /// The child keys in label order.
    pub fn child_keys(&self) -> Vec<Key> {
        self.entries.iter().map(|(_, k)| *k).collect()
    }

    /// Number of child entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the node has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An immutable value: a payload plus the keys of its DAG predecessors.
///
/// The value's [`Key`] is the digest of its canonical encoding, so it is a
/// pure function of payload and predecessors. The predecessor list is sorted
/// and deduplicated at construction, which makes merge results hash the same
/// regardless of argument order. The key is computed lazily and cached.
#[derive(Clone, Debug)]
pub struct Value {
    payload: Payload,
    predecessors: Vec<Key>,
    cached_key: OnceLock<Key>,
}

impl Value {
    /// A blob value with no predecessors.
    pub fn blob(data: impl Into<Vec<u8>>) -> Self {
        Self::with_predecessors(Payload::Blob(data.into()), Vec::new())
    }

    /// A node value whose predecessors are its child keys.
    pub fn node(entries: Vec<(String, Key)>) -> Self {
        let node = Node::new(entries);
        let children = node.child_keys();
        Self::with_predecessors(Payload::Node(node), children)
    }

    /// A node value with inline content; predecessors are the child keys.
    pub fn node_with_content(entries: Vec<(String, Key)>, content: Vec<u8>) -> Self {
        let mut node = Node::new(entries);
        node.content = Some(content);
        let children = node.child_keys();
        Self::with_predecessors(Payload::Node(node), children)
    }

    /// A value with an explicit predecessor list (sorted and deduplicated).
    pub fn with_predecessors(payload: Payload, mut predecessors: Vec<Key>) -> Self {
        predecessors.sort();
        predecessors.dedup();
        Self {
            payload,
            predecessors,
            cached_key: OnceLock::new(),
        }
    }

    /// Reassemble a decoded value without re-sorting.
    ///
    /// Used by the wire decoder: the bytes on the wire are already in
    /// canonical order, and re-sorting would mask a peer that sends
    /// non-canonical encodings instead of letting content addressing
    /// reject them.
    pub(crate) fn from_parts(payload: Payload, predecessors: Vec<Key>) -> Self {
        Self {
            payload,
            predecessors,
            cached_key: OnceLock::new(),
        }
    }

    /// The payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The predecessor keys, in sorted order.
    pub fn predecessors(&self) -> &[Key] {
        &self.predecessors
    }

    /// The content-addressed key: digest of the canonical encoding.
    ///
    /// Computed on first use and cached.
    pub fn key(&self) -> Key {
        *self
            .cached_key
            .get_or_init(|| Key::of_bytes(&self.encode()))
    }

    /// Returns `true` for blob values.
    pub fn is_blob(&self) -> bool {
        self.payload.is_blob()
    }

    /// Returns `true` for node values.
    pub fn is_node(&self) -> bool {
        self.payload.is_node()
    }
}

// The cache is derived state; equality is payload + predecessors.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.payload == other.payload && self.predecessors == other.predecessors
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Blob(data) => write!(f, "blob({} bytes)", data.len()),
            Payload::Node(node) => write!(f, "node({} entries)", node.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_has_no_predecessors() {
        let v = Value::blob(b"hello".to_vec());
        assert!(v.is_blob());
        assert!(v.predecessors().is_empty());
    }

    #[test]
    fn node_predecessors_are_sorted_child_keys() {
        let a = Key::of_bytes(b"a");
        let b = Key::of_bytes(b"b");
        let v = Value::node(vec![("x".to_string(), b), ("y".to_string(), a)]);
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(v.predecessors(), &expected);
    }

    #[test]
    fn node_entries_sorted_by_label() {
        let k = Key::of_bytes(b"k");
        let v = Value::node(vec![
            ("zebra".to_string(), k),
            ("alpha".to_string(), k),
        ]);
        let Payload::Node(node) = v.payload() else {
            panic!("expected node");
        };
        assert_eq!(node.entries[0].0, "alpha");
        assert_eq!(node.entries[1].0, "zebra");
    }

    #[test]
    fn key_is_deterministic() {
        let a = Value::blob(b"same".to_vec());
        let b = Value::blob(b"same".to_vec());
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_depends_on_payload() {
        assert_ne!(
            Value::blob(b"one".to_vec()).key(),
            Value::blob(b"two".to_vec()).key()
        );
    }

    #[test]
    fn key_depends_on_predecessors() {
        let payload = Payload::Blob(b"same".to_vec());
        let plain = Value::with_predecessors(payload.clone(), Vec::new());
        let with_pred =
            Value::with_predecessors(payload, vec![Key::of_bytes(b"parent")]);
        assert_ne!(plain.key(), with_pred.key());
    }

    #[test]
    fn predecessor_order_does_not_change_key() {
        let p1 = Key::of_bytes(b"p1");
        let p2 = Key::of_bytes(b"p2");
        let a = Value::with_predecessors(Payload::Blob(b"v".to_vec()), vec![p1, p2]);
        let b = Value::with_predecessors(Payload::Blob(b"v".to_vec()), vec![p2, p1]);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn duplicate_predecessors_collapse() {
        let p = Key::of_bytes(b"p");
        let v = Value::with_predecessors(Payload::Blob(b"v".to_vec()), vec![p, p]);
        assert_eq!(v.predecessors(), &[p]);
    }

    #[test]
    fn key_matches_manual_digest_of_encoding() {
        let v = Value::blob(b"hello".to_vec());
        assert_eq!(v.key(), Key::of_bytes(&v.encode()));
    }

    #[test]
    fn cached_key_survives_clone() {
        let v = Value::blob(b"clone me".to_vec());
        let key = v.key();
        let cloned = v.clone();
        assert_eq!(cloned.key(), key);
    }

    #[test]
    fn node_get_and_child_keys() {
        let a = Key::of_bytes(b"a");
        let b = Key::of_bytes(b"b");
        let node = Node::new(vec![("l1".to_string(), a), ("l2".to_string(), b)]);
        assert_eq!(node.get("l1"), Some(a));
        assert_eq!(node.get("missing"), None);
        assert_eq!(node.child_keys().len(), 2);
        assert!(!node.is_empty());
    }

    #[test]
    fn equality_ignores_cache() {
        let a = Value::blob(b"eq".to_vec());
        let b = Value::blob(b"eq".to_vec());
        let _ = a.key(); // populate one cache only
        assert_eq!(a, b);
    }

    #[test]
    fn display_summarizes() {
        assert_eq!(format!("{}", Value::blob(b"xyz".to_vec())), "blob(3 bytes)");
        let k = Key::of_bytes(b"k");
        assert_eq!(
            format!("{}", Value::node(vec![("a".to_string(), k)])),
            "node(1 entries)"
        );
    }
}
