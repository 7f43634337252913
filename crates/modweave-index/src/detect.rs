//! Conflict detection.
//!
//! Mods are visited in load order. When a mod claims a path, any owner it
//! declares as a dependency is first dropped from that path's owner list:
//! a mod layered on top of its own dependency overrides it on purpose. The
//! result therefore depends on the load order, which must be the dependency
//! order produced by the registry.

use std::collections::BTreeMap;
use std::path::Path;

use modweave_types::{normalize_key, ConflictSet, ModRecord};
use tracing::{debug, info};

use crate::error::{IndexError, IndexResult};

/// Collects contested paths across a set of mods.
#[derive(Clone, Debug, Default)]
pub struct ConflictDetector {
    /// Normalized watched directories. Empty means every directory.
    watched: Vec<String>,
    /// Lower-cased extensions without the dot. Empty means every extension.
    extensions: Vec<String>,
}

impl ConflictDetector {
    /// Detector restricted to `watched_dirs` (relative, any depth).
    pub fn new<I, S>(watched_dirs: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut watched = Vec::new();
        for dir in watched_dirs {
            let raw = dir.as_ref();
            let key = normalize_key(raw);
            if key.is_empty() || key.split('/').any(|c| c == "..") {
                return Err(IndexError::InvalidWatchedDir(raw.to_string()));
            }
            if !watched.contains(&key) {
                watched.push(key);
            }
        }
        Ok(Self {
            watched,
            extensions: Vec::new(),
        })
    }

    /// Only consider files with one of these extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    pub fn watched_dirs(&self) -> &[String] {
        &self.watched
    }

    fn extension_allowed(&self, path: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        Path::new(path)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| self.extensions.contains(&e))
    }

    /// Every normalized path `record` provides under `dir`.
    fn provided_under(&self, record: &ModRecord, dir: &str) -> Vec<String> {
        let tree = record.provided_paths();
        if dir.is_empty() {
            return tree.walk_files().iter().map(|f| normalize_key(f)).collect();
        }
        tree.subtrees_ignore_case(dir)
            .into_iter()
            .flat_map(|(spelling, node)| {
                node.walk_files()
                    .into_iter()
                    .map(move |f| normalize_key(&format!("{spelling}/{f}")))
            })
            .collect()
    }

    /// Detect conflicts among `mods`, which must be in load order.
    pub fn detect(&self, mods: &[ModRecord]) -> ConflictSet {
        let mut owners: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let all = [String::new()];
        let dirs: &[String] = if self.watched.is_empty() {
            &all
        } else {
            &self.watched
        };

        for dir in dirs {
            for record in mods {
                for path in self.provided_under(record, dir) {
                    if !self.extension_allowed(&path) {
                        continue;
                    }
                    let list = owners.entry(path).or_default();
                    list.retain(|owner| !record.depends_on(owner));
                    if !list.iter().any(|o| o == record.name()) {
                        list.push(record.name().to_string());
                    }
                }
            }
        }

        let provided = owners.len();
        let conflicts = ConflictSet::from_owner_map(owners);
        for (path, owners) in conflicts.iter() {
            debug!(%path, owners = ?owners, "contested path");
        }
        info!(
            mods = mods.len(),
            provided,
            contested = conflicts.len(),
            "conflict detection complete"
        );
        conflicts
    }
}

/// Detect conflicts among `mods` (in load order) inside `watched_dirs`.
pub fn detect<S: AsRef<str>>(mods: &[ModRecord], watched_dirs: &[S]) -> IndexResult<ConflictSet> {
    Ok(ConflictDetector::new(watched_dirs)?.detect(mods))
}
