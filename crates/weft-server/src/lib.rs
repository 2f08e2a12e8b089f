//! TCP server for the Weft object database.
//!
//! Binds a listening socket and runs one protocol state machine per
//! accepted connection, all against a single shared
//! [`Database`](weft_sdk::Database). Connection failures are logged and
//! scoped to the connection that hit them.

pub mod config;
pub mod error;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::WeftServer;
