//! The mutable tag namespace.
//!
//! Tags are the only mutable state in the system: human-chosen names bound
//! to keys in the DAG. Any UTF-8 string is a legal name; the namespace
//! imposes no structure of its own. Updates to a single tag are serialized
//! by the store and observed in order; across tags nothing is promised. A
//! tag may name a key whose value has not arrived yet; dangling tags become
//! valid as sync delivers the bytes.
//!
//! Every mutation is announced on a broadcast channel as a [`TagEvent`],
//! which is what the protocol's watch mode is built from.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{TagError, TagResult};
pub use memory::MemoryTagStore;
pub use traits::{TagEvent, TagStore};
