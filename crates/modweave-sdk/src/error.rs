use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    /// The configuration file is missing, unreadable, or malformed.
    #[error("{}", config_message(.path, .message))]
    Config {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("no product {product:?} in the configuration (available: {})", .available.join(", "))]
    UnknownProduct {
        product: String,
        available: Vec<String>,
    },

    #[error("registry error: {0}")]
    Registry(#[from] modweave_registry::RegistryError),

    #[error("index error: {0}")]
    Index(#[from] modweave_index::IndexError),

    #[error("merge error: {0}")]
    Merge(#[from] modweave_merge::MergeError),

    #[error("output error: {0}")]
    Pack(#[from] modweave_pack::PackError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn config_message(path: &Option<PathBuf>, message: &str) -> String {
    match path {
        Some(p) => format!("{}: {message}", p.display()),
        None => format!("config error: {message}"),
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
