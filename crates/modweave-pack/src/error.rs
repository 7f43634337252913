use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing the patch mod.
#[derive(Debug, Error)]
pub enum PackError {
    /// The patch name has no characters usable in a file name.
    #[error("patch name {0:?} has no usable characters")]
    InvalidPatchName(String),

    /// A relative output path is empty, absolute, or escapes its root.
    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(String),

    #[error("zip error writing {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PackResult<T> = Result<T, PackError>;
