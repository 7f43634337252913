//! Error types for the mod registry.

use std::path::PathBuf;

use modweave_types::TypeError;

/// Errors that can occur while loading mods.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The launcher settings file listing enabled mods does not exist.
    #[error("mod manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// A descriptor lacks a name or a usable data location.
    #[error("invalid descriptor {path}: {reason}")]
    InvalidDescriptor {
        /// The `.mod` file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A referenced archive or directory could not be found, even ignoring case.
    #[error("location not found: {0}")]
    LocationNotFound(PathBuf),

    /// The container could not be opened or read as a zip archive.
    #[error("archive error in {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// A file requested from a mod is not part of it.
    #[error("entry {entry} not found in {location}")]
    EntryNotFound { location: PathBuf, entry: String },

    /// Two or more mods depend on each other, directly or transitively.
    #[error("dependency cycle among mods: {}", .0.join(", "))]
    DependencyCycle(Vec<String>),

    /// A record could not be built.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// I/O error reading descriptors or mod content.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for registry results.
pub type RegistryResult<T> = Result<T, RegistryError>;
