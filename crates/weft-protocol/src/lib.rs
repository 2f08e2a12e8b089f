//! The Weft wire protocol.
//!
//! One bidirectional byte stream per connection. The client sends a one
//! byte opcode followed by the operation's arguments in canonical encoding;
//! the server answers with a one byte status (`OK`/`ERR`) and the reply
//! body, in request order. `WATCH` upgrades the connection: after the `OK`
//! the server streams tag-change events until the client closes.
//!
//! [`Client`] drives the protocol from the requesting side;
//! [`serve_connection`] is the per-connection state machine on the serving
//! side, dispatching into a [`Database`](weft_sdk::Database).

pub mod client;
pub mod error;
pub mod message;
pub mod server;

pub use client::{Client, WatchStream};
pub use error::{ProtocolError, ProtocolResult};
pub use message::{Opcode, Request, WatchEvent, STATUS_ERR, STATUS_OK};
pub use server::{serve_connection, Limits};
