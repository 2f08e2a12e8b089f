//! The requesting side of the protocol.

use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};

use weft_types::{Graph, Key, Tag, Value};
use weft_wire::{Window, WriteWindow};

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{Request, WatchEvent, STATUS_ERR, STATUS_OK};

/// A protocol client over any bidirectional byte stream.
///
/// Requests are answered in order; each method sends one request and reads
/// its reply. A [`ProtocolError::Remote`] leaves the connection usable;
/// wire-level errors do not.
pub struct Client<S> {
    reader: Window<ReadHalf<S>>,
    writer: WriteWindow<WriteHalf<S>>,
}

impl<S: AsyncRead + AsyncWrite> Client<S> {
    /// Wrap a stream with default window capacities.
    pub fn new(stream: S) -> Self {
        Self::with_capacity(stream, weft_wire::INITIAL_WINDOW)
    }

    /// Wrap a stream with explicit window capacities.
    pub fn with_capacity(stream: S, capacity: usize) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: Window::with_capacity(read_half, capacity),
            writer: WriteWindow::with_capacity(write_half, capacity),
        }
    }

    async fn send(&mut self, request: &Request) -> ProtocolResult<()> {
        request.write_to(&mut self.writer);
        self.writer.flush().await?;
        Ok(())
    }

    /// Read the status byte; an `ERR` reply surfaces as
    /// [`ProtocolError::Remote`].
    async fn read_status(&mut self) -> ProtocolResult<()> {
        match self.reader.read_u8().await? {
            STATUS_OK => Ok(()),
            STATUS_ERR => {
                let message: String = self.reader.read().await?;
                Err(ProtocolError::Remote(message))
            }
            other => Err(ProtocolError::InvalidStatus(other)),
        }
    }

    async fn call_unit(&mut self, request: Request) -> ProtocolResult<()> {
        self.send(&request).await?;
        self.read_status().await
    }

    async fn call<T: weft_types::WireDecode>(&mut self, request: Request) -> ProtocolResult<T> {
        self.send(&request).await?;
        self.read_status().await?;
        Ok(self.reader.read().await?)
    }

    // -- key graph ---------------------------------------------------------

    /// Insert a vertex into the remote key graph.
    pub async fn key_add(&mut self, key: Key) -> ProtocolResult<()> {
        self.call_unit(Request::KeyAdd(key)).await
    }

    /// Insert an edge into the remote key graph.
    pub async fn key_relation(&mut self, pred: Key, succ: Key) -> ProtocolResult<()> {
        self.call_unit(Request::KeyRelation(pred, succ)).await
    }

    /// All vertices of the remote key graph.
    pub async fn key_list(&mut self) -> ProtocolResult<Vec<Key>> {
        self.call(Request::KeyList).await
    }

    /// Predecessors of a key on the remote.
    pub async fn key_predecessors(&mut self, key: Key) -> ProtocolResult<Vec<Key>> {
        self.call(Request::KeyPredecessors(key)).await
    }

    /// Successors of a key on the remote.
    pub async fn key_successors(&mut self, key: Key) -> ProtocolResult<Vec<Key>> {
        self.call(Request::KeySuccessors(key)).await
    }

    // -- values ------------------------------------------------------------

    /// Write a value to the remote, receiving its key.
    pub async fn value_write(&mut self, value: &Value) -> ProtocolResult<Key> {
        self.call(Request::ValueWrite(value.clone())).await
    }

    /// Read a value from the remote.
    pub async fn value_read(&mut self, key: Key) -> ProtocolResult<Option<Value>> {
        self.call(Request::ValueRead(key)).await
    }

    // -- tags --------------------------------------------------------------

    /// Create or move a tag on the remote.
    pub async fn tag_update(&mut self, tag: &Tag, key: Key) -> ProtocolResult<()> {
        self.call_unit(Request::TagUpdate(tag.clone(), key)).await
    }

    /// Remove a tag on the remote.
    pub async fn tag_remove(&mut self, tag: &Tag) -> ProtocolResult<()> {
        self.call_unit(Request::TagRemove(tag.clone())).await
    }

    /// Read a tag on the remote.
    pub async fn tag_read(&mut self, tag: &Tag) -> ProtocolResult<Option<Key>> {
        self.call(Request::TagRead(tag.clone())).await
    }

    /// All tags on the remote.
    pub async fn tag_list(&mut self) -> ProtocolResult<Vec<Tag>> {
        self.call(Request::TagList).await
    }

    // -- sync --------------------------------------------------------------

    /// The remote's ancestry closure of `sinks`, cut at `roots`.
    pub async fn pull_keys(&mut self, roots: Vec<Key>, sinks: Vec<Tag>) -> ProtocolResult<Graph> {
        self.call(Request::SyncPullKeys { roots, sinks }).await
    }

    /// Every tag/key pair on the remote.
    pub async fn pull_tags(&mut self) -> ProtocolResult<Vec<(Tag, Key)>> {
        self.call(Request::SyncPullTags).await
    }

    /// Push graph shape and advance tags on the remote.
    ///
    /// Values travel separately: stream them with
    /// [`value_write`](Self::value_write) after this returns.
    pub async fn push_keys(&mut self, graph: Graph, tags: Vec<(Tag, Key)>) -> ProtocolResult<()> {
        self.call_unit(Request::SyncPushKeys { graph, tags }).await
    }

    /// Advance tags on the remote without moving graph shape.
    pub async fn push_tags(&mut self, pairs: Vec<(Tag, Key)>) -> ProtocolResult<()> {
        self.call_unit(Request::SyncPushTags(pairs)).await
    }

    /// Upgrade the connection into a watch stream.
    ///
    /// An empty tag list watches every tag. The connection is consumed:
    /// after this, the server only speaks events.
    pub async fn watch(mut self, tags: Vec<Tag>) -> ProtocolResult<WatchStream<S>> {
        self.send(&Request::Watch(tags)).await?;
        self.read_status().await?;
        Ok(WatchStream {
            reader: self.reader,
            _writer: self.writer,
        })
    }
}

/// A stream of tag-change events from a watched server.
///
/// Dropping the stream closes the connection, which is how the
/// subscription ends.
pub struct WatchStream<S> {
    reader: Window<ReadHalf<S>>,
    // Held so the write half stays open while watching.
    _writer: WriteWindow<WriteHalf<S>>,
}

impl<S: AsyncRead + AsyncWrite> WatchStream<S> {
    /// The next event, or `None` when the server closes the stream.
    pub async fn next(&mut self) -> ProtocolResult<Option<WatchEvent>> {
        Ok(self.reader.read_or_eof().await?)
    }
}
