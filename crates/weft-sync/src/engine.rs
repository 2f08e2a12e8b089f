use std::collections::HashSet;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use weft_graph::closure::ancestry_closure;
use weft_protocol::{Client, WatchStream};
use weft_sdk::Database;
use weft_types::{Key, Tag};

use crate::error::SyncResult;
use crate::types::{PullReport, PushReport};

const DEFAULT_MAX_CLOSURE: usize = 1_000_000;

/// Drives pull, push, and watch against one remote peer.
///
/// Owns a protocol [`Client`] and a local [`Database`]; every operation
/// reconciles the two.
pub struct SyncClient<S> {
    client: Client<S>,
    db: Database,
    max_closure: usize,
}

impl<S: AsyncRead + AsyncWrite> SyncClient<S> {
    /// A sync client with the default closure cap.
    pub fn new(client: Client<S>, db: Database) -> Self {
        Self {
            client,
            db,
            max_closure: DEFAULT_MAX_CLOSURE,
        }
    }

    /// Override the vertex cap applied to locally computed closures.
    pub fn with_max_closure(mut self, max_closure: usize) -> Self {
        self.max_closure = max_closure;
        self
    }

    /// The local database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Pull the subgraphs named by the remote's `sinks` tags.
    ///
    /// An empty `sinks` pulls every remote tag. The transfer is cut at the
    /// keys our own tags already name: the remote never walks past what we
    /// have. Shape is adopted first, then values the local store is
    /// missing, then the tags themselves.
    pub async fn pull(&mut self, sinks: &[Tag]) -> SyncResult<PullReport> {
        let remote_tags = self.client.pull_tags().await?;
        let sinks: Vec<Tag> = if sinks.is_empty() {
            remote_tags.iter().map(|(tag, _)| tag.clone()).collect()
        } else {
            sinks.to_vec()
        };

        // Everything our tags can reach is already here.
        let mut roots = Vec::new();
        for tag in self.db.tags().list().await? {
            if let Some(key) = self.db.tags().read(&tag).await? {
                roots.push(key);
            }
        }

        let graph = self.client.pull_keys(roots, sinks.clone()).await?;
        debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "pulled graph shape"
        );

        for vertex in &graph.vertices {
            self.db.graph().add_key(*vertex).await?;
        }
        for (pred, succ) in &graph.edges {
            self.db.graph().add_relation(*pred, *succ).await?;
        }

        let mut values_fetched = 0;
        for vertex in &graph.vertices {
            if self.db.values().contains(vertex).await? {
                continue;
            }
            if let Some(value) = self.client.value_read(*vertex).await? {
                self.db.commit(&value).await?;
                values_fetched += 1;
            }
        }

        let wanted: HashSet<&Tag> = sinks.iter().collect();
        let mut tags_updated = Vec::new();
        for (tag, key) in remote_tags {
            if wanted.contains(&tag) {
                self.db.tags().update(&tag, key).await?;
                tags_updated.push(tag);
            }
        }

        Ok(PullReport {
            vertices: graph.vertex_count(),
            values_fetched,
            tags_updated,
        })
    }

    /// Push the subgraphs our `tags` name to the remote.
    ///
    /// The transferred subgraph is our ancestry of those tags cut at every
    /// key the remote's tags already name: the minimization is ours to
    /// do, the protocol does not deduplicate. Shape and tags go over in
    /// one request, then the values stream.
    pub async fn push(&mut self, tags: &[Tag]) -> SyncResult<PushReport> {
        let remote_heads: Vec<Key> = self
            .client
            .pull_tags()
            .await?
            .into_iter()
            .map(|(_, key)| key)
            .collect();

        let mut pairs = Vec::new();
        let mut sink_keys = Vec::new();
        for tag in tags {
            if let Some(key) = self.db.tags().read(tag).await? {
                pairs.push((tag.clone(), key));
                sink_keys.push(key);
            }
        }

        let graph = ancestry_closure(
            self.db.graph().as_ref(),
            &sink_keys,
            &remote_heads,
            self.max_closure,
        )
        .await?;
        debug!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "pushing graph shape"
        );

        self.client.push_keys(graph.clone(), pairs.clone()).await?;

        let mut values_sent = 0;
        for vertex in &graph.vertices {
            if let Some(value) = self.db.checkout(vertex).await? {
                self.client.value_write(&value).await?;
                values_sent += 1;
            }
        }

        Ok(PushReport {
            vertices: graph.vertex_count(),
            values_sent,
            tags_advanced: pairs.into_iter().map(|(tag, _)| tag).collect(),
        })
    }

    /// Subscribe to remote tag changes, consuming the connection.
    pub async fn watch(self, tags: Vec<Tag>) -> SyncResult<WatchStream<S>> {
        Ok(self.client.watch(tags).await?)
    }
}
