use weft_wire::WireError;

/// Errors from protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The peer sent an opcode this version does not know.
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),

    /// The server answered with a status byte that is neither OK nor ERR.
    #[error("invalid status byte {0:#04x}")]
    InvalidStatus(u8),

    /// The server answered `ERR`.
    ///
    /// The connection stays usable; the failure is scoped to the request.
    #[error("remote error: {0}")]
    Remote(String),

    /// Stream-level failure: I/O, malformed bytes, unexpected EOF.
    ///
    /// Fatal for the connection.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Storage failed underneath the server in a way that cannot be
    /// reported as a request-scoped error (corruption, backend I/O).
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Result alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
