//! Buffered byte windows over async streams.
//!
//! The canonical encoding itself lives in [`weft_types::encode`]; this crate
//! supplies the I/O half: a read [`Window`] that pages bytes in from an
//! `AsyncRead` until a decode succeeds, and a [`WriteWindow`] that buffers
//! encodings and flushes them to an `AsyncWrite`. Together they give every
//! domain type the async `read`/`write` pair the protocol layer is built on.

pub mod error;
pub mod window;

pub use error::{WireError, WireResult};
pub use window::{Window, WriteWindow, INITIAL_WINDOW};
