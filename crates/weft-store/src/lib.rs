//! Content-addressed value storage.
//!
//! A [`ValueStore`] is an append-only partial map from [`Key`] to
//! [`Value`] where every key is the digest of its value's canonical
//! encoding. Writes are idempotent; nothing is ever mutated or removed.
//! Any backend (memory, disk, remote) implements the same trait; the
//! in-memory [`MemoryValueStore`] is the reference.
//!
//! [`Key`]: weft_types::Key
//! [`Value`]: weft_types::Value

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryValueStore;
pub use traits::ValueStore;
