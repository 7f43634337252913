//! Error types for the conflict index.

use std::path::PathBuf;

/// Errors that can occur while indexing conflicts.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The base product install directory does not exist.
    #[error("base product directory not found: {0}")]
    BaseRootNotFound(PathBuf),

    /// A watched directory is empty or escapes the mod root.
    #[error("invalid watched directory: {0:?}")]
    InvalidWatchedDir(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
