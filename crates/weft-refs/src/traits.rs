use async_trait::async_trait;
use tokio::sync::broadcast;

use weft_types::{Key, Tag};

use crate::error::TagResult;

/// A change to a single tag.
///
/// `previous`/`current` of `None` mean the tag was absent before the change
/// or removed by it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagEvent {
    pub tag: Tag,
    pub previous: Option<Key>,
    pub current: Option<Key>,
}

/// Storage backend for the tag namespace.
///
/// Implementations must serialize mutations per tag (readers observe a
/// single tag's updates in write order) and must not require the named key
/// to exist anywhere: dangling tags are legal. Every effective mutation is
/// announced to subscribers.
#[async_trait]
pub trait TagStore: Send + Sync {
    /// Create or move a tag to `key`.
    async fn update(&self, tag: &Tag, key: Key) -> TagResult<()>;

    /// Remove a tag. Returns `false` (and stays silent) if it was absent.
    async fn remove(&self, tag: &Tag) -> TagResult<bool>;

    /// The key a tag names, if the tag exists.
    async fn read(&self, tag: &Tag) -> TagResult<Option<Key>>;

    /// All tags, sorted by name.
    async fn list(&self) -> TagResult<Vec<Tag>>;

    /// Subscribe to tag changes.
    ///
    /// Events for mutations issued after this call are delivered in per-tag
    /// order. A slow subscriber may observe `Lagged` and should resync from
    /// `list`/`read`.
    fn subscribe(&self) -> broadcast::Receiver<TagEvent>;
}
