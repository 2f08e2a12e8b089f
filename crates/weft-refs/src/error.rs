/// Errors from tag store operations.
///
/// Tag names themselves never fail: any UTF-8 string is acceptable.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    /// I/O error from the underlying storage backend.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for tag store operations.
pub type TagResult<T> = Result<T, TagError>;
