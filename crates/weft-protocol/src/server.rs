//! The serving side: one cooperative state machine per connection.

use std::collections::HashSet;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use weft_graph::closure::{ancestry_closure, tag_delta};
use weft_sdk::{Database, DbError};
use weft_store::StoreError;
use weft_types::{Graph, Key, Tag, Value};
use weft_wire::{Window, WriteWindow};

use crate::error::{ProtocolError, ProtocolResult};
use crate::message::{Request, WatchEvent, STATUS_ERR, STATUS_OK};

/// Per-connection tunables.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    /// Bytes pre-allocated for each window.
    pub initial_window: usize,
    /// Safety cap on a single pull or watch-delta closure.
    pub max_pull_vertices: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            initial_window: weft_wire::INITIAL_WINDOW,
            max_pull_vertices: 1_000_000,
        }
    }
}

/// Serve one connection until the peer closes or a fatal error occurs.
///
/// The loop reads one full request, dispatches it against `db`, writes one
/// full reply, and repeats. Request-scoped failures (closure cap, unknown
/// opcode) are reported to the peer as `ERR`; stream-level and storage
/// failures tear the connection down. A `WATCH` request upgrades
/// the connection into event streaming and never returns to the
/// request/reply loop.
pub async fn serve_connection<S>(stream: S, db: Database, limits: Limits) -> ProtocolResult<()>
where
    S: AsyncRead + AsyncWrite + Send,
{
    let (read_half, write_half) = tokio::io::split(stream);
    let mut reader = Window::with_capacity(read_half, limits.initial_window);
    let mut writer = WriteWindow::with_capacity(write_half, limits.initial_window);

    loop {
        let request = match Request::read_from(&mut reader).await {
            Ok(None) => return Ok(()),
            Ok(Some(request)) => request,
            Err(ProtocolError::UnknownOpcode(byte)) => {
                // The argument shape is unknowable, so the stream cannot be
                // re-framed: report and close.
                warn!(opcode = byte, "unknown opcode, closing connection");
                write_err(&mut writer, format!("unknown opcode {byte:#04x}")).await?;
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        debug!(op = request.opcode().name(), "request");

        if let Request::Watch(tags) = request {
            return run_watch(&mut reader, &mut writer, tags, &db, &limits).await;
        }

        match handle(request, &db, &limits).await {
            Ok(reply) => {
                writer.write_u8(STATUS_OK);
                reply.write_to(&mut writer);
                writer.flush().await?;
            }
            Err(err) if is_fatal(&err) => {
                return Err(ProtocolError::Storage(err.to_string()));
            }
            Err(err) => {
                warn!(error = %err, "request failed");
                write_err(&mut writer, err.to_string()).await?;
            }
        }
    }
}

async fn write_err<W: AsyncWrite + Unpin>(
    writer: &mut WriteWindow<W>,
    message: String,
) -> ProtocolResult<()> {
    writer.write_u8(STATUS_ERR);
    writer.write(&message);
    writer.flush().await?;
    Ok(())
}

/// Corruption and backend I/O cannot be expressed as a request-scoped
/// failure; the connection comes down instead.
fn is_fatal(err: &DbError) -> bool {
    matches!(
        err,
        DbError::Store(StoreError::Integrity { .. }) | DbError::Store(StoreError::Io(_))
    )
}

/// Typed reply bodies, written after the `OK` status byte.
enum Reply {
    Unit,
    Key(Key),
    Keys(Vec<Key>),
    MaybeValue(Option<Value>),
    MaybeKey(Option<Key>),
    Tags(Vec<Tag>),
    TagPairs(Vec<(Tag, Key)>),
    Graph(Graph),
}

impl Reply {
    fn write_to<W: AsyncWrite + Unpin>(&self, w: &mut WriteWindow<W>) {
        match self {
            Self::Unit => {}
            Self::Key(key) => w.write(key),
            Self::Keys(keys) => w.write(keys),
            Self::MaybeValue(value) => w.write(value),
            Self::MaybeKey(key) => w.write(key),
            Self::Tags(tags) => w.write(tags),
            Self::TagPairs(pairs) => w.write(pairs),
            Self::Graph(graph) => w.write(graph),
        }
    }
}

async fn handle(request: Request, db: &Database, limits: &Limits) -> Result<Reply, DbError> {
    match request {
        Request::KeyAdd(key) => {
            db.graph().add_key(key).await?;
            Ok(Reply::Unit)
        }
        Request::KeyRelation(pred, succ) => {
            db.graph().add_relation(pred, succ).await?;
            Ok(Reply::Unit)
        }
        Request::KeyList => Ok(Reply::Keys(db.graph().list().await?)),
        Request::KeyPredecessors(key) => {
            Ok(Reply::Keys(db.graph().predecessors(&key).await?))
        }
        Request::KeySuccessors(key) => Ok(Reply::Keys(db.graph().successors(&key).await?)),
        Request::ValueWrite(value) => Ok(Reply::Key(db.commit(&value).await?)),
        Request::ValueRead(key) => Ok(Reply::MaybeValue(db.checkout(&key).await?)),
        Request::TagUpdate(tag, key) => {
            db.tags().update(&tag, key).await?;
            Ok(Reply::Unit)
        }
        Request::TagRemove(tag) => {
            db.tags().remove(&tag).await?;
            Ok(Reply::Unit)
        }
        Request::TagRead(tag) => Ok(Reply::MaybeKey(db.tags().read(&tag).await?)),
        Request::TagList => Ok(Reply::Tags(db.tags().list().await?)),
        Request::SyncPullKeys { roots, sinks } => {
            let mut sink_keys = Vec::new();
            for tag in &sinks {
                if let Some(key) = db.tags().read(tag).await? {
                    sink_keys.push(key);
                }
            }
            let graph = ancestry_closure(
                db.graph().as_ref(),
                &sink_keys,
                &roots,
                limits.max_pull_vertices,
            )
            .await?;
            Ok(Reply::Graph(graph))
        }
        Request::SyncPullTags => {
            let mut pairs = Vec::new();
            for tag in db.tags().list().await? {
                if let Some(key) = db.tags().read(&tag).await? {
                    pairs.push((tag, key));
                }
            }
            Ok(Reply::TagPairs(pairs))
        }
        Request::SyncPushKeys { graph, tags } => {
            for vertex in &graph.vertices {
                db.graph().add_key(*vertex).await?;
            }
            for (pred, succ) in &graph.edges {
                db.graph().add_relation(*pred, *succ).await?;
            }
            for (tag, key) in &tags {
                db.tags().update(tag, *key).await?;
            }
            Ok(Reply::Unit)
        }
        Request::SyncPushTags(pairs) => {
            for (tag, key) in &pairs {
                db.tags().update(tag, *key).await?;
            }
            Ok(Reply::Unit)
        }
        // Watch never reaches the request/reply dispatcher.
        Request::Watch(_) => unreachable!("watch is handled before dispatch"),
    }
}

/// The streaming half of `WATCH`.
///
/// Subscribes before acknowledging so no event between the `OK` and the
/// first `recv` is lost. An empty tag list watches everything.
async fn run_watch<R, W>(
    reader: &mut Window<R>,
    writer: &mut WriteWindow<W>,
    tags: Vec<Tag>,
    db: &Database,
    limits: &Limits,
) -> ProtocolResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut events = db.tags().subscribe();
    let watched: HashSet<Tag> = tags.into_iter().collect();

    writer.write_u8(STATUS_OK);
    writer.flush().await?;

    loop {
        tokio::select! {
            closed = reader.read_u8_or_eof() => {
                // The client speaks no more after WATCH; any byte or EOF
                // ends the subscription.
                if closed?.is_some() {
                    warn!("client sent data during watch, closing");
                }
                return Ok(());
            }
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "watch subscriber lagged, events dropped");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return Ok(()),
                };
                if !watched.is_empty() && !watched.contains(&event.tag) {
                    continue;
                }
                let delta = tag_delta(
                    db.graph().as_ref(),
                    event.current,
                    event.previous,
                    limits.max_pull_vertices,
                )
                .await
                .unwrap_or_else(|err| {
                    warn!(error = %err, "watch delta skipped");
                    Graph::new()
                });
                let frame = WatchEvent {
                    tags: vec![(event.tag, event.current)],
                    graph: delta,
                };
                writer.write(&frame);
                writer.flush().await?;
            }
        }
    }
}
