use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use weft_types::{ByteReader, DecodeError, WireDecode, WireEncode};

use crate::error::{WireError, WireResult};

/// Default window capacity pre-allocated per connection (64 KiB).
pub const INITIAL_WINDOW: usize = 64 * 1024;

// Consumed prefix beyond which the buffer is compacted in place.
const COMPACT_THRESHOLD: usize = 64 * 1024;

/// A buffered read window over an async byte stream.
///
/// The window holds a contiguous byte buffer and a cursor. Typed reads run
/// the pure decoder against the resident bytes; when the decoder reports a
/// shortfall the window suspends until at least that many more bytes arrive,
/// then retries. A failed decode never advances the cursor, so a poisoned
/// frame is detectable without consuming the stream.
pub struct Window<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
}

impl<R: AsyncRead + Unpin> Window<R> {
    /// A window with the default initial capacity.
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, INITIAL_WINDOW)
    }

    /// A window with an explicit initial capacity.
    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(capacity),
            pos: 0,
        }
    }

    /// Bytes resident past the cursor.
    pub fn resident(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Suspend until at least `n` bytes are resident past the cursor.
    ///
    /// Fails with [`WireError::UnexpectedEof`] if the stream ends first.
    pub async fn require(&mut self, n: usize) -> WireResult<()> {
        while self.resident() < n {
            let read = self.inner.read_buf(&mut self.buf).await?;
            if read == 0 {
                return Err(WireError::UnexpectedEof);
            }
        }
        Ok(())
    }

    /// Read one decodable value, suspending for more bytes as needed.
    pub async fn read<T: WireDecode>(&mut self) -> WireResult<T> {
        loop {
            let outcome = {
                let mut reader = ByteReader::new(&self.buf[self.pos..]);
                T::decode_from(&mut reader).map(|v| (v, reader.consumed()))
            };
            match outcome {
                Ok((value, used)) => {
                    self.advance(used);
                    return Ok(value);
                }
                Err(DecodeError::Truncated { missing }) => {
                    self.require(self.resident() + missing).await?;
                }
                Err(err) => return Err(WireError::Decode(err)),
            }
        }
    }

    /// Read a single byte (opcode and status bytes are unframed).
    pub async fn read_u8(&mut self) -> WireResult<u8> {
        self.require(1).await?;
        let byte = self.buf[self.pos];
        self.advance(1);
        Ok(byte)
    }

    /// Read a single byte, or `None` on a clean close at a frame boundary.
    ///
    /// EOF with bytes already resident is still [`WireError::UnexpectedEof`]:
    /// the peer died mid-frame.
    pub async fn read_u8_or_eof(&mut self) -> WireResult<Option<u8>> {
        if self.resident() == 0 {
            let read = self.inner.read_buf(&mut self.buf).await?;
            if read == 0 {
                return Ok(None);
            }
        }
        self.read_u8().await.map(Some)
    }

    /// Read one decodable value, or `None` on a clean close at a frame
    /// boundary. Used by streaming readers whose frames arrive back to
    /// back until the peer closes.
    pub async fn read_or_eof<T: WireDecode>(&mut self) -> WireResult<Option<T>> {
        if self.resident() == 0 {
            let read = self.inner.read_buf(&mut self.buf).await?;
            if read == 0 {
                return Ok(None);
            }
        }
        self.read().await.map(Some)
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
        if self.pos == self.buf.len() {
            self.buf.clear();
            self.pos = 0;
        } else if self.pos > COMPACT_THRESHOLD {
            self.buf.drain(..self.pos);
            self.pos = 0;
        }
    }
}

/// A buffered write window over an async byte stream.
///
/// Writes accumulate encodings in memory; [`flush`](WriteWindow::flush)
/// pushes the buffer to the stream. One request or response frame per flush
/// keeps the peer from observing partial frames.
pub struct WriteWindow<W> {
    inner: W,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin> WriteWindow<W> {
    /// A write window with the default initial capacity.
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, INITIAL_WINDOW)
    }

    /// A write window with an explicit initial capacity.
    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        Self {
            inner,
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Buffer one encodable value.
    pub fn write<T: WireEncode>(&mut self, value: &T) {
        value.encode_into(&mut self.buf);
    }

    /// Buffer a single byte.
    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Bytes buffered but not yet flushed.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Push all buffered bytes to the stream.
    pub async fn flush(&mut self) -> WireResult<()> {
        if !self.buf.is_empty() {
            self.inner.write_all(&self.buf).await?;
            self.buf.clear();
        }
        self.inner.flush().await?;
        Ok(())
    }

    /// Flush and shut down the write half.
    pub async fn shutdown(&mut self) -> WireResult<()> {
        self.flush().await?;
        self.inner.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_types::{Graph, Key, Tag, Value};

    #[tokio::test]
    async fn roundtrip_through_duplex() {
        let (client, server) = tokio::io::duplex(256);
        let mut writer = WriteWindow::new(client);
        let mut reader = Window::new(server);

        let value = Value::blob(b"hello".to_vec());
        let key = value.key();
        writer.write(&value);
        writer.write(&key);
        writer.write(&Tag::new("main"));
        writer.flush().await.unwrap();

        assert_eq!(reader.read::<Value>().await.unwrap(), value);
        assert_eq!(reader.read::<Key>().await.unwrap(), key);
        assert_eq!(reader.read::<Tag>().await.unwrap(), Tag::new("main"));
    }

    #[tokio::test]
    async fn read_suspends_for_trickled_bytes() {
        // A tiny duplex buffer forces the value across in many small pages.
        let (client, server) = tokio::io::duplex(8);
        let value = Value::node_with_content(
            vec![
                ("alpha".to_string(), Key::of_bytes(b"a")),
                ("beta".to_string(), Key::of_bytes(b"b")),
            ],
            vec![0xAB; 300],
        );
        let expected = value.clone();

        let writer_task = tokio::spawn(async move {
            let mut writer = WriteWindow::new(client);
            writer.write(&value);
            writer.flush().await.unwrap();
        });

        let mut reader = Window::with_capacity(server, 16);
        let decoded: Value = reader.read().await.unwrap();
        assert_eq!(decoded, expected);
        writer_task.await.unwrap();
    }

    #[tokio::test]
    async fn eof_at_boundary_is_clean() {
        let (client, server) = tokio::io::duplex(64);
        drop(client);
        let mut reader = Window::new(server);
        assert!(reader.read_u8_or_eof().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn eof_mid_frame_is_an_error() {
        let (client, server) = tokio::io::duplex(64);
        let mut writer = WriteWindow::new(client);
        let encoded = Value::blob(b"truncated".to_vec()).encode();
        // Send all but the last byte, then close.
        writer.buf.extend_from_slice(&encoded[..encoded.len() - 1]);
        writer.shutdown().await.unwrap();

        let mut reader = Window::new(server);
        let err = reader.read::<Value>().await.unwrap_err();
        assert!(matches!(err, WireError::UnexpectedEof));
    }

    #[tokio::test]
    async fn malformed_frame_is_a_decode_error() {
        let (client, server) = tokio::io::duplex(64);
        let mut writer = WriteWindow::new(client);
        writer.write_u8(0xEE); // not a valid payload tag
        writer.flush().await.unwrap();

        let mut reader = Window::new(server);
        let err = reader.read::<Value>().await.unwrap_err();
        assert!(matches!(err, WireError::Decode(_)));
    }

    #[tokio::test]
    async fn graph_and_lists_roundtrip() {
        let (client, server) = tokio::io::duplex(1024);
        let a = Key::of_bytes(b"a");
        let b = Key::of_bytes(b"b");
        let graph = Graph {
            vertices: vec![a, b],
            edges: vec![(a, b)],
        };
        let tags = vec![
            (Tag::new("main"), a),
            (Tag::new("dev"), b),
        ];

        let mut writer = WriteWindow::new(client);
        writer.write(&graph);
        writer.write(&tags);
        writer.flush().await.unwrap();

        let mut reader = Window::new(server);
        assert_eq!(reader.read::<Graph>().await.unwrap(), graph);
        assert_eq!(reader.read::<Vec<(Tag, Key)>>().await.unwrap(), tags);
    }

    #[tokio::test]
    async fn window_reuses_buffer_across_frames() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer = WriteWindow::new(client);
        for i in 0..10u8 {
            writer.write(&Value::blob(vec![i; 50]));
        }
        writer.flush().await.unwrap();

        let mut reader = Window::with_capacity(server, 32);
        for i in 0..10u8 {
            let v: Value = reader.read().await.unwrap();
            assert_eq!(v, Value::blob(vec![i; 50]));
        }
        assert_eq!(reader.resident(), 0);
    }
}
