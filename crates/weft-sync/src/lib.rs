//! Synchronization between Weft peers.
//!
//! The engine drives the wire protocol from the client side and keeps the
//! transfer minimal: pull fetches the remote's ancestry cut at what we
//! already have, push sends our ancestry cut at what the remote's tags
//! already name. Graph shape travels first, values second, so a peer can
//! know the full shape of an incoming subgraph before a single payload
//! byte arrives.

pub mod engine;
pub mod error;
pub mod types;

pub use engine::SyncClient;
pub use error::{SyncError, SyncResult};
pub use types::{PullReport, PushReport};
