use weft_graph::GraphError;
use weft_refs::TagError;
use weft_store::StoreError;

/// Errors from database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Tag(#[from] TagError),
}

/// Result alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

// Lets a `Database` stand in wherever a bare value store is expected
// (notably under the recursive merger) without losing store errors.
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Store(e) => e,
            other => StoreError::Backend(other.to_string()),
        }
    }
}
