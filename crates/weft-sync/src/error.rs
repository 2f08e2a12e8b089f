use weft_graph::GraphError;
use weft_protocol::ProtocolError;
use weft_refs::TagError;
use weft_sdk::DbError;
use weft_store::StoreError;

/// Errors from sync operations.
///
/// Any server `ERR` (surfaced as
/// [`ProtocolError::Remote`](weft_protocol::ProtocolError::Remote)) is
/// terminal for the operation that hit it.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Tag(#[from] TagError),
}

/// Result alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
