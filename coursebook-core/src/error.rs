//! Error types for coursebook-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from program store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the file path and serde_yaml's line context.
    #[error("failed to parse program at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Neither `$COURSEBOOK_HOME` nor `dirs::home_dir()` yielded a location.
    #[error("cannot determine home directory; set $COURSEBOOK_HOME or $HOME")]
    HomeNotFound,

    /// The program YAML file did not exist at the expected path.
    #[error("program not found at {path}")]
    ProgramNotFound { path: PathBuf },
}

/// Errors raised while importing a course export payload.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Payload is not valid JSON or does not match the export shape.
    #[error("invalid course export: {0}")]
    Json(#[from] serde_json::Error),

    /// The export contains no lessons, so pages have no owner.
    #[error("course export '{name}' contains no lessons")]
    NoLessons { name: String },
}
