//! Foundation types for the Weft object database.
//!
//! This crate provides the domain types shared by every other Weft crate:
//! content-addressed keys, immutable values, mutable tag names, and the
//! canonical binary encoding that keys are derived from.
//!
//! # Key Types
//!
//! - [`Key`] — 160-bit content digest identifying a [`Value`]
//! - [`Value`] — immutable payload plus predecessor keys; hashes to its [`Key`]
//! - [`Payload`] / [`Node`] — blob bytes, or an ordered label→key listing
//! - [`Tag`] — human-chosen name bound to a [`Key`]
//! - [`Graph`] — a transferable slice of the key DAG (vertices + edges)
//!
//! The [`encode`] module defines the wire-exact binary encoding
//! ([`WireEncode`]/[`WireDecode`]); the [`json`] module is the
//! human-readable debug mirror of the same types.

pub mod encode;
pub mod error;
pub mod graph;
pub mod json;
pub mod key;
pub mod tag;
pub mod value;

pub use encode::{ByteReader, DecodeError, WireDecode, WireEncode};
pub use error::TypeError;
pub use graph::Graph;
pub use key::Key;
pub use tag::Tag;
pub use value::{Node, Payload, Value};
