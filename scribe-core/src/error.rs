use thiserror::Error;

/// Failures the chat store surfaces to its caller.
///
/// Read failures never appear here: a missing or unreadable transcript reads
/// as an empty chat.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to delete {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}
