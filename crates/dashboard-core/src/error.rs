use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the crime dashboard.
///
/// Row-level problems (missing or malformed values) are never errors; they
/// are resolved to sentinels or the row is dropped. Only dataset-level
/// failures end up here.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An export file or directory could not be created.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader or writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The header row lacks one of the required incident columns.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// A terminal call in the dashboard loop failed.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashboardError>;
