/// Errors from server lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// Result alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
