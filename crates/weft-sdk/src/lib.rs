//! Embedding surface for the Weft object database.
//!
//! A [`Database`] wires the three stores (values, key graph, tags) into
//! one handle with the right coupling between them: committing a value also
//! registers its key and predecessor edges in the graph, so the graph
//! always knows the shape of everything the value store holds, and possibly
//! more: keys whose values are still in flight.

pub mod database;
pub mod error;

pub use database::Database;
pub use error::{DbError, DbResult};
