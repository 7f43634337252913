use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid relative path: {0}")]
    InvalidPath(String),

    #[error("mod name must not be empty")]
    EmptyModName,
}
