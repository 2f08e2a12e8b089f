/// Errors from key graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An ancestry traversal visited more vertices than the configured cap.
    #[error("closure exceeded the {limit}-vertex cap")]
    ClosureCapExceeded { limit: usize },

    /// I/O error from the underlying storage backend.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for key graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
