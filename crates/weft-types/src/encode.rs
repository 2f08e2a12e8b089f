//! Canonical binary encoding of the domain types.
//!
//! This is the one place the wire format lives. Every encodable type
//! satisfies two laws relied on throughout the system:
//!
//! - `x.encoded_len() == x.encode().len()`
//! - `T::decode(&x.encode()) == Ok(x)`
//!
//! Encoding rules: all integers fixed-width big-endian (`u32` lengths and
//! list counts, `u64` sequence counts); strings are a `u32` length prefix
//! followed by UTF-8 bytes; lists are a `u32` count followed by that many
//! elements; keys are raw digest bytes with no prefix; options are a one
//! byte presence tag; values are a one byte payload tag (0 = blob,
//! 1 = node), the payload, then the predecessor list.
//!
//! Decoding from a short buffer fails with [`DecodeError::Truncated`]
//! carrying the exact shortfall, which lets a buffered reader page in
//! precisely the missing bytes and retry.

use crate::graph::Graph;
use crate::key::Key;
use crate::tag::Tag;
use crate::value::{Node, Payload, Value};

/// Errors from decoding canonical bytes.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The input ended before the current field was complete.
    #[error("truncated input: {missing} more bytes required")]
    Truncated { missing: usize },

    /// The bytes were present but malformed.
    #[error("invalid {what}: {detail}")]
    Invalid { what: &'static str, detail: String },
}

/// A type with a canonical binary encoding.
pub trait WireEncode {
    /// Serialized byte length.
    fn encoded_len(&self) -> usize;

    /// Append the canonical bytes to `buf`.
    fn encode_into(&self, buf: &mut Vec<u8>);

    /// The canonical bytes as an owned vector.
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }
}

/// A type decodable from its canonical binary encoding.
pub trait WireDecode: Sized {
    /// Decode one value, advancing the reader past it.
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError>;

    /// Decode one value from the front of `bytes`. Trailing bytes are
    /// permitted (the canonical stream carries values back to back).
    fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(bytes);
        Self::decode_from(&mut r)
    }
}

// ---------------------------------------------------------------------------
// Primitive writers
// ---------------------------------------------------------------------------

pub fn put_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn put_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

/// Length-prefixed byte string: `u32` length then the raw bytes.
pub fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    put_u32(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}

/// Encoded length of a length-prefixed byte string.
pub fn bytes_len(bytes: &[u8]) -> usize {
    4 + bytes.len()
}

// ---------------------------------------------------------------------------
// Cursor reader
// ---------------------------------------------------------------------------

/// A positioned reader over a byte slice.
///
/// Every read either succeeds and advances the cursor, or fails with
/// [`DecodeError::Truncated`] and leaves the cursor where it was, so a
/// caller can retry the whole decode once more bytes are resident.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn consumed(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Truncated {
                missing: n - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes(bytes.try_into().expect("4-byte slice")))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let bytes = self.take(8)?;
        Ok(u64::from_be_bytes(bytes.try_into().expect("8-byte slice")))
    }

    /// Read exactly `n` raw bytes.
    pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.take(n)
    }

    /// Read a length-prefixed byte string.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Strings and tags
// ---------------------------------------------------------------------------

impl WireEncode for String {
    fn encoded_len(&self) -> usize {
        bytes_len(self.as_bytes())
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        put_bytes(buf, self.as_bytes());
    }
}

impl WireDecode for String {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let bytes = r.read_bytes()?;
        String::from_utf8(bytes).map_err(|e| DecodeError::Invalid {
            what: "utf-8 string",
            detail: e.to_string(),
        })
    }
}

impl WireEncode for Tag {
    fn encoded_len(&self) -> usize {
        bytes_len(self.as_str().as_bytes())
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        put_bytes(buf, self.as_str().as_bytes());
    }
}

impl WireDecode for Tag {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        Ok(Tag::new(String::decode_from(r)?))
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

impl WireEncode for Key {
    fn encoded_len(&self) -> usize {
        Key::WIDTH
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(self.as_bytes());
    }
}

impl WireDecode for Key {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let bytes = r.read_exact(Key::WIDTH)?;
        let digest: [u8; Key::WIDTH] = bytes.try_into().expect("digest-width slice");
        Ok(Key::from_digest(digest))
    }
}

// ---------------------------------------------------------------------------
// Composites
// ---------------------------------------------------------------------------

impl<T: WireEncode> WireEncode for Vec<T> {
    fn encoded_len(&self) -> usize {
        4 + self.iter().map(WireEncode::encoded_len).sum::<usize>()
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        put_u32(buf, self.len() as u32);
        for item in self {
            item.encode_into(buf);
        }
    }
}

impl<T: WireDecode> WireDecode for Vec<T> {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let count = r.read_u32()? as usize;
        // Capacity is clamped: the count is attacker-controlled and the
        // elements may not all be resident yet.
        let mut items = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            items.push(T::decode_from(r)?);
        }
        Ok(items)
    }
}

impl<T: WireEncode> WireEncode for Option<T> {
    fn encoded_len(&self) -> usize {
        1 + self.as_ref().map_or(0, WireEncode::encoded_len)
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        match self {
            None => put_u8(buf, 0),
            Some(v) => {
                put_u8(buf, 1);
                v.encode_into(buf);
            }
        }
    }
}

impl<T: WireDecode> WireDecode for Option<T> {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        match r.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::decode_from(r)?)),
            tag => Err(DecodeError::Invalid {
                what: "option tag",
                detail: format!("expected 0 or 1, got {tag}"),
            }),
        }
    }
}

impl<A: WireEncode, B: WireEncode> WireEncode for (A, B) {
    fn encoded_len(&self) -> usize {
        self.0.encoded_len() + self.1.encoded_len()
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        self.0.encode_into(buf);
        self.1.encode_into(buf);
    }
}

impl<A: WireDecode, B: WireDecode> WireDecode for (A, B) {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let a = A::decode_from(r)?;
        let b = B::decode_from(r)?;
        Ok((a, b))
    }
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

const PAYLOAD_BLOB: u8 = 0;
const PAYLOAD_NODE: u8 = 1;

impl WireEncode for Value {
    fn encoded_len(&self) -> usize {
        let payload_len = match self.payload() {
            Payload::Blob(data) => bytes_len(data),
            Payload::Node(node) => {
                node.entries.encoded_len()
                    + 1
                    + node.content.as_deref().map_or(0, bytes_len)
            }
        };
        1 + payload_len + 4 + self.predecessors().len() * Key::WIDTH
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        match self.payload() {
            Payload::Blob(data) => {
                put_u8(buf, PAYLOAD_BLOB);
                put_bytes(buf, data);
            }
            Payload::Node(node) => {
                put_u8(buf, PAYLOAD_NODE);
                node.entries.encode_into(buf);
                match &node.content {
                    None => put_u8(buf, 0),
                    Some(content) => {
                        put_u8(buf, 1);
                        put_bytes(buf, content);
                    }
                }
            }
        }
        put_u32(buf, self.predecessors().len() as u32);
        for pred in self.predecessors() {
            pred.encode_into(buf);
        }
    }
}

impl WireDecode for Value {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let payload = match r.read_u8()? {
            PAYLOAD_BLOB => Payload::Blob(r.read_bytes()?),
            PAYLOAD_NODE => {
                let entries = Vec::<(String, Key)>::decode_from(r)?;
                let content = match r.read_u8()? {
                    0 => None,
                    1 => Some(r.read_bytes()?),
                    tag => {
                        return Err(DecodeError::Invalid {
                            what: "node content tag",
                            detail: format!("expected 0 or 1, got {tag}"),
                        })
                    }
                };
                Payload::Node(Node { entries, content })
            }
            tag => {
                return Err(DecodeError::Invalid {
                    what: "payload tag",
                    detail: format!("expected blob (0) or node (1), got {tag}"),
                })
            }
        };
        let predecessors = Vec::<Key>::decode_from(r)?;
        Ok(Value::from_parts(payload, predecessors))
    }
}

// ---------------------------------------------------------------------------
// Graphs
// ---------------------------------------------------------------------------

impl WireEncode for Graph {
    fn encoded_len(&self) -> usize {
        self.vertices.encoded_len() + self.edges.encoded_len()
    }

    fn encode_into(&self, buf: &mut Vec<u8>) {
        self.vertices.encode_into(buf);
        self.edges.encode_into(buf);
    }
}

impl WireDecode for Graph {
    fn decode_from(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let vertices = Vec::<Key>::decode_from(r)?;
        let edges = Vec::<(Key, Key)>::decode_from(r)?;
        Ok(Graph { vertices, edges })
    }
}
