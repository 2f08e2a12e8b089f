//! The key graph: an append-only DAG of keys.
//!
//! The graph tracks the shape of the value DAG independently of the values
//! themselves: a key can be a vertex before its value has arrived, which is
//! what lets bulk pulls transfer graph shape first and bytes second. Vertices
//! and edges are never removed.
//!
//! [`KeyGraphStore`] is the storage contract, [`MemoryKeyGraph`] the
//! reference backend, and [`closure`] holds the ancestry traversals that
//! pull and watch are built from.

pub mod closure;
pub mod error;
pub mod memory;
pub mod traits;

pub use closure::ancestry_closure;
pub use error::{GraphError, GraphResult};
pub use memory::MemoryKeyGraph;
pub use traits::KeyGraphStore;
