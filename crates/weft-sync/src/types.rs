use weft_types::Tag;

/// What a pull accomplished.
#[derive(Clone, Debug, Default)]
pub struct PullReport {
    /// Vertices in the transferred subgraph.
    pub vertices: usize,
    /// Values fetched because they were missing locally.
    pub values_fetched: usize,
    /// Local tags moved to the remote's keys.
    pub tags_updated: Vec<Tag>,
}

impl PullReport {
    /// Returns `true` if the pull moved nothing.
    pub fn is_noop(&self) -> bool {
        self.vertices == 0 && self.values_fetched == 0 && self.tags_updated.is_empty()
    }
}

/// What a push accomplished.
#[derive(Clone, Debug, Default)]
pub struct PushReport {
    /// Vertices in the transferred subgraph.
    pub vertices: usize,
    /// Values streamed to the remote.
    pub values_sent: usize,
    /// Remote tags advanced to our keys.
    pub tags_advanced: Vec<Tag>,
}
