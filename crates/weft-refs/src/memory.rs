use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use weft_types::{Key, Tag};

use crate::error::TagResult;
use crate::traits::{TagEvent, TagStore};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// In-memory tag store.
///
/// Tags live in a `HashMap` behind a `RwLock`; the lock serializes updates,
/// which gives the per-tag ordering guarantee for free. Events are emitted
/// while the write lock is held so subscribers see them in mutation order.
pub struct MemoryTagStore {
    tags: RwLock<HashMap<Tag, Key>>,
    events: broadcast::Sender<TagEvent>,
}

impl MemoryTagStore {
    /// Create a new empty tag store.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tags: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no tags exist.
    pub fn is_empty(&self) -> bool {
        self.tags.read().expect("lock poisoned").is_empty()
    }

    fn announce(&self, event: TagEvent) {
        // A send error just means nobody is watching right now.
        let _ = self.events.send(event);
    }
}

impl Default for MemoryTagStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TagStore for MemoryTagStore {
    async fn update(&self, tag: &Tag, key: Key) -> TagResult<()> {
        let mut tags = self.tags.write().expect("lock poisoned");
        let previous = tags.insert(tag.clone(), key);
        debug!(tag = %tag, key = %key.short_hex(), "updated tag");
        self.announce(TagEvent {
            tag: tag.clone(),
            previous,
            current: Some(key),
        });
        Ok(())
    }

    async fn remove(&self, tag: &Tag) -> TagResult<bool> {
        let mut tags = self.tags.write().expect("lock poisoned");
        match tags.remove(tag) {
            Some(previous) => {
                debug!(tag = %tag, "removed tag");
                self.announce(TagEvent {
                    tag: tag.clone(),
                    previous: Some(previous),
                    current: None,
                });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn read(&self, tag: &Tag) -> TagResult<Option<Key>> {
        let tags = self.tags.read().expect("lock poisoned");
        Ok(tags.get(tag).copied())
    }

    async fn list(&self) -> TagResult<Vec<Tag>> {
        let tags = self.tags.read().expect("lock poisoned");
        let mut names: Vec<Tag> = tags.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn subscribe(&self) -> broadcast::Receiver<TagEvent> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for MemoryTagStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTagStore")
            .field("tag_count", &self.len())
            .finish()
    }
}
