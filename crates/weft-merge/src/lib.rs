//! Merge algebra for Weft values.
//!
//! Two values that diverged from a common history compose back into one:
//! blobs only when identical, nodes label by label with divergent child
//! keys handed to a caller-supplied resolver. Conflict is an answer, not an
//! error: [`merge`] returns `None` and the caller decides what to do.
//!
//! [`StoreMerger`] supplies the resolver a real client wants: divergent
//! children are loaded from a [`ValueStore`](weft_store::ValueStore) and
//! merged recursively, writing merged intermediates back.

pub mod algebra;
pub mod store;

pub use algebra::merge;
pub use store::StoreMerger;
