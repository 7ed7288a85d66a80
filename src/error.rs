// Error taxonomy for the core API

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the core API.
///
/// Per-file failures during indexing (unreadable files, extractor panics)
/// are counted in `IndexStats::errors` and never become an `Error`; only
/// whole-operation failures do.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Filesystem failure outside of the per-file skip policy.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed caller input, rejected before touching the store.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Underlying persistence unavailable or corrupt. Fatal for the run.
    #[error("store failure: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("store connection pool failure: {0}")]
    Pool(#[from] r2d2::Error),

    /// Analysis requested on an index with zero files.
    #[error("index is empty, run index() first")]
    EmptyIndex,

    /// Queried symbol absent. Exploratory lookups return empty results
    /// instead; this is used where an explicit target is required.
    #[error("symbol not found: {0}")]
    NotFound(String),

    #[error("serialization failure: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
