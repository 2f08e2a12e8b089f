use tokio::io::{AsyncRead, AsyncWrite};

use weft_types::{
    ByteReader, DecodeError, Graph, Key, Tag, Value, WireDecode, WireEncode,
};
use weft_wire::{Window, WriteWindow};

use crate::error::{ProtocolError, ProtocolResult};

/// Reply status: the request succeeded, the typed body follows.
pub const STATUS_OK: u8 = 0x00;
/// Reply status: the request failed, an error string follows.
pub const STATUS_ERR: u8 = 0x01;

/// Operation codes, one byte on the wire.
///
/// `0x00` is reserved so an all-zero byte is never a valid request start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    KeyAdd = 0x01,
    KeyRelation = 0x02,
    KeyList = 0x03,
    KeyPredecessors = 0x04,
    KeySuccessors = 0x05,
    ValueWrite = 0x06,
    ValueRead = 0x07,
    TagUpdate = 0x08,
    TagRemove = 0x09,
    TagRead = 0x0a,
    TagList = 0x0b,
    SyncPullKeys = 0x0c,
    SyncPullTags = 0x0d,
    SyncPushKeys = 0x0e,
    SyncPushTags = 0x0f,
    Watch = 0x10,
}

impl Opcode {
    /// Parse a wire byte.
    pub fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            0x01 => Self::KeyAdd,
            0x02 => Self::KeyRelation,
            0x03 => Self::KeyList,
            0x04 => Self::KeyPredecessors,
            0x05 => Self::KeySuccessors,
            0x06 => Self::ValueWrite,
            0x07 => Self::ValueRead,
            0x08 => Self::TagUpdate,
            0x09 => Self::TagRemove,
            0x0a => Self::TagRead,
            0x0b => Self::TagList,
            0x0c => Self::SyncPullKeys,
            0x0d => Self::SyncPullTags,
            0x0e => Self::SyncPushKeys,
            0x0f => Self::SyncPushTags,
            0x10 => Self::Watch,
            _ => return None,
        })
    }

    /// Human name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::KeyAdd => "KEY_ADD",
            Self::KeyRelation => "KEY_REL",
            Self::KeyList => "KEY_LIST",
            Self::KeyPredecessors => "KEY_PRED",
            Self::KeySuccessors => "KEY_SUCC",
            Self::ValueWrite => "VAL_WRITE",
            Self::ValueRead => "VAL_READ",
            Self::TagUpdate => "TAG_UPDATE",
            Self::TagRemove => "TAG_REMOVE",
            Self::TagRead => "TAG_READ",
            Self::TagList => "TAG_LIST",
            Self::SyncPullKeys => "SYNC_PULL_KEYS",
            Self::SyncPullTags => "SYNC_PULL_TAGS",
            Self::SyncPushKeys => "SYNC_PUSH_KEYS",
            Self::SyncPushTags => "SYNC_PUSH_TAGS",
            Self::Watch => "WATCH",
        }
    }
}

/// A decoded request: opcode plus arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    KeyAdd(Key),
    KeyRelation(Key, Key),
    KeyList,
    KeyPredecessors(Key),
    KeySuccessors(Key),
    ValueWrite(Value),
    ValueRead(Key),
    TagUpdate(Tag, Key),
    TagRemove(Tag),
    TagRead(Tag),
    TagList,
    SyncPullKeys { roots: Vec<Key>, sinks: Vec<Tag> },
    SyncPullTags,
    SyncPushKeys { graph: Graph, tags: Vec<(Tag, Key)> },
    SyncPushTags(Vec<(Tag, Key)>),
    Watch(Vec<Tag>),
}

impl Request {
    /// The opcode of this request.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::KeyAdd(_) => Opcode::KeyAdd,
            Self::KeyRelation(_, _) => Opcode::KeyRelation,
            Self::KeyList => Opcode::KeyList,
            Self::KeyPredecessors(_) => Opcode::KeyPredecessors,
            Self::KeySuccessors(_) => Opcode::KeySuccessors,
            Self::ValueWrite(_) => Opcode::ValueWrite,
            Self::ValueRead(_) => Opcode::ValueRead,
            Self::TagUpdate(_, _) => Opcode::TagUpdate,
            Self::TagRemove(_) => Opcode::TagRemove,
            Self::TagRead(_) => Opcode::TagRead,
            Self::TagList => Opcode::TagList,
            Self::SyncPullKeys { .. } => Opcode::SyncPullKeys,
            Self::SyncPullTags => Opcode::SyncPullTags,
            Self::SyncPushKeys { .. } => Opcode::SyncPushKeys,
            Self::SyncPushTags(_) => Opcode::SyncPushTags,
            Self::Watch(_) => Opcode::Watch,
        }
    }

    /// Buffer the request frame (opcode + arguments) into a write window.
    pub fn write_to<W: AsyncWrite + Unpin>(&self, w: &mut WriteWindow<W>) {
        w.write_u8(self.opcode() as u8);
        match self {
            Self::KeyAdd(key)
            | Self::KeyPredecessors(key)
            | Self::KeySuccessors(key)
            | Self::ValueRead(key) => w.write(key),
            Self::KeyRelation(pred, succ) => {
                w.write(pred);
                w.write(succ);
            }
            Self::KeyList | Self::TagList | Self::SyncPullTags => {}
            Self::ValueWrite(value) => w.write(value),
            Self::TagUpdate(tag, key) => {
                w.write(tag);
                w.write(key);
            }
            Self::TagRemove(tag) | Self::TagRead(tag) => w.write(tag),
            Self::SyncPullKeys { roots, sinks } => {
                w.write(roots);
                w.write(sinks);
            }
            Self::SyncPushKeys { graph, tags } => {
                w.write(graph);
                w.write(tags);
            }
            Self::SyncPushTags(pairs) => w.write(pairs),
            Self::Watch(tags) => w.write(tags),
        }
    }

    /// Read one request frame from a window.
    ///
    /// `Ok(None)` is a clean close between frames. An unknown opcode is
    /// [`ProtocolError::UnknownOpcode`]; without knowing the argument shape
    /// the stream cannot be re-framed past it.
    pub async fn read_from<R: AsyncRead + Unpin>(
        window: &mut Window<R>,
    ) -> ProtocolResult<Option<Self>> {
        let Some(byte) = window.read_u8_or_eof().await? else {
            return Ok(None);
        };
        let opcode = Opcode::from_u8(byte).ok_or(ProtocolError::UnknownOpcode(byte))?;
        let request = match opcode {
            Opcode::KeyAdd => Self::KeyAdd(window.read().await?),
            Opcode::KeyRelation => {
                Self::KeyRelation(window.read().await?, window.read().await?)
            }
            Opcode::KeyList => Self::KeyList,
            Opcode::KeyPredecessors => Self::KeyPredecessors(window.read().await?),
            Opcode::KeySuccessors => Self::KeySuccessors(window.read().await?),
            Opcode::ValueWrite => Self::ValueWrite(window.read().await?),
            Opcode::ValueRead => Self::ValueRead(window.read().await?),
            Opcode::TagUpdate => {
                Self::TagUpdate(window.read().await?, window.read().await?)
            }
            Opcode::TagRemove => Self::TagRemove(window.read().await?),
            Opcode::TagRead => Self::TagRead(window.read().await?),
            Opcode::TagList => Self::TagList,
            Opcode::SyncPullKeys => Self::SyncPullKeys {
                roots: window.read().await?,
                sinks: window.read().await?,
            },
            Opcode::SyncPullTags => Self::SyncPullTags,
            Opcode::SyncPushKeys => Self::SyncPushKeys {
                graph: window.read().await?,
                tags: window.read().await?,
            },
            Opcode::SyncPushTags => Self::SyncPushTags(window.read().await?),
            Opcode::Watch => Self::Watch(window.read().await?),
        };
        Ok(Some(request))
    }
}

/// One frame of a watch stream: the tags that moved and the graph their
/// movement made newly reachable.
///
/// A removed tag appears with `None` for its key and contributes an empty
/// delta.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchEvent {
    pub tags: Vec<(Tag, Option<Key>)>,
    pub graph: Graph,
}

impl WireEncode for WatchEvent {
    fn encoded_len(&self) -> usize {
        self.tags.encoded_len() + self.graph.encoded_len()
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        self.tags.encode_into(buf);
        self.graph.encode_into(buf);
    }
}

impl WireDecode for WatchEvent {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let tags = Vec::<(Tag, Option<Key>)>::decode_from(r)?;
        let graph = Graph::decode_from(r)?;
        Ok(Self { tags, graph })
    }
}
