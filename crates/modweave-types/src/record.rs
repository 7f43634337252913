//! Mod records: identity, provenance, and provided files of one mod.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::path_tree::PathTree;

/// Where a mod's files live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModSource {
    /// A packaged `.zip` container.
    Archive(PathBuf),
    /// An unpacked directory.
    Directory(PathBuf),
}

impl ModSource {
    /// The filesystem location of the container or directory.
    pub fn location(&self) -> &Path {
        match self {
            Self::Archive(path) | Self::Directory(path) => path,
        }
    }

    /// Returns `true` for packaged mods.
    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive(_))
    }
}

/// One loaded mod.
///
/// Built once by the registry from a descriptor and a file listing; never
/// mutated afterwards. The `name` is the join key for conflicts and
/// dependencies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModRecord {
    name: String,
    descriptor: PathBuf,
    source: ModSource,
    provided_paths: PathTree,
    dependencies: Vec<String>,
    replace_paths: Vec<String>,
    user_dir: Option<String>,
}

impl ModRecord {
    /// Create a record with no dependencies, replace paths, or user dir.
    pub fn new(
        name: impl Into<String>,
        descriptor: impl Into<PathBuf>,
        source: ModSource,
        provided_paths: PathTree,
    ) -> Result<Self, TypeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TypeError::EmptyModName);
        }
        Ok(Self {
            name,
            descriptor: descriptor.into(),
            source,
            provided_paths,
            dependencies: Vec::new(),
            replace_paths: Vec::new(),
            user_dir: None,
        })
    }

    /// Set the declared dependencies, dropping duplicates but keeping the
    /// first-seen order.
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.clear();
        for dep in dependencies {
            let dep = dep.into();
            if !self.dependencies.contains(&dep) {
                self.dependencies.push(dep);
            }
        }
        self
    }

    pub fn with_replace_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.replace_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_user_dir(mut self, user_dir: Option<String>) -> Self {
        self.user_dir = user_dir;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the `.mod` descriptor this record was read from.
    pub fn descriptor(&self) -> &Path {
        &self.descriptor
    }

    pub fn source(&self) -> &ModSource {
        &self.source
    }

    /// Location of the archive or directory holding the mod's files.
    pub fn archive_location(&self) -> &Path {
        self.source.location()
    }

    pub fn provided_paths(&self) -> &PathTree {
        &self.provided_paths
    }

    /// Declared dependency names, in declaration order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Returns `true` if this mod declares a dependency on `name`.
    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }

    pub fn replace_paths(&self) -> &[String] {
        &self.replace_paths
    }

    pub fn user_dir(&self) -> Option<&str> {
        self.user_dir.as_deref()
    }

    /// The mod name reduced to ASCII alphanumerics, for use as a folder name.
    pub fn folder_name(&self) -> String {
        self.name.chars().filter(char::is_ascii_alphanumeric).collect()
    }
}
