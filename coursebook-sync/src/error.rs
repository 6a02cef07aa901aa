//! Error types for coursebook-sync.

use std::path::PathBuf;

use thiserror::Error;

use coursebook_core::StoreError;
use coursebook_renderer::RenderError;

/// All errors that can arise while rendering programs to disk.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the template engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An error from the program store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (hash store).
    #[error("hash store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
