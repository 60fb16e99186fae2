//! Error types for specnote-core.
//!
//! Only collaborator boundaries can fail. The annotation engine itself never
//! surfaces an error: corrupt state collapses to an empty collection and
//! failed writes are logged by the lifecycle coordinator.

/// Failure of the persistent key-value collaborator.
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("could not encode comments: {0}")]
    Encode(#[from] EnvelopeError),
}

/// Why a comment collection could not be converted to or from its persisted
/// blob.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unsupported envelope version {0}")]
    Version(u32),
}

/// Failure to fetch replacement document content after a live update.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document not found: {0}")]
    NotFound(String),
}

/// Failure to deliver an exported prompt to the user.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}
