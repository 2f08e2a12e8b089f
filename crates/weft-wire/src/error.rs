use weft_types::DecodeError;

/// Errors from windowed stream I/O.
///
/// Any of these is fatal for the connection that produced it: a stream that
/// has desynchronized cannot be re-framed.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Underlying stream failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed bytes on the stream.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The peer closed the stream in the middle of a frame.
    #[error("unexpected end of stream")]
    UnexpectedEof,
}

/// Result alias for wire operations.
pub type WireResult<T> = Result<T, WireError>;
