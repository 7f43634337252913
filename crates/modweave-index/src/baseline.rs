//! Locating the unmodified base-product copy of each contested file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use modweave_types::ConflictSet;
use tracing::{debug, info};

use crate::error::{IndexError, IndexResult};

/// Contested path to the absolute location of its baseline file. Paths with
/// no baseline are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaselineMap {
    entries: BTreeMap<String, PathBuf>,
}

impl BaselineMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, location: impl Into<PathBuf>) {
        self.entries.insert(path.into(), location.into());
    }

    pub fn get(&self, path: &str) -> Option<&Path> {
        self.entries.get(path).map(PathBuf::as_path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_path()))
    }

    /// Contested paths in `conflicts` that have no baseline.
    pub fn missing<'a>(&self, conflicts: &'a ConflictSet) -> Vec<&'a str> {
        conflicts.paths().filter(|p| !self.contains(p)).collect()
    }
}

/// Resolves relative paths under a root ignoring case.
///
/// Directory listings are read once and cached, since contested paths tend
/// to share directories.
#[derive(Debug)]
pub struct BaselineResolver {
    root: PathBuf,
    listings: HashMap<PathBuf, HashMap<String, PathBuf>>,
}

impl BaselineResolver {
    pub fn new(root: impl Into<PathBuf>) -> IndexResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(IndexError::BaseRootNotFound(root));
        }
        Ok(Self {
            root,
            listings: HashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn listing(&mut self, dir: &Path) -> &HashMap<String, PathBuf> {
        self.listings.entry(dir.to_path_buf()).or_insert_with(|| {
            let mut names: Vec<PathBuf> = fs::read_dir(dir)
                .map(|rd| rd.filter_map(Result::ok).map(|e| e.path()).collect())
                .unwrap_or_default();
            // First spelling in sorted order wins when a directory holds two.
            names.sort();
            let mut map = HashMap::new();
            for path in names {
                if let Some(name) = path.file_name() {
                    map.entry(name.to_string_lossy().to_lowercase())
                        .or_insert(path);
                }
            }
            map
        })
    }

    /// The file at `path` under the root, matched ignoring case.
    pub fn resolve(&mut self, path: &str) -> Option<PathBuf> {
        let mut current = self.root.clone();
        for component in path.split(['/', '\\']).filter(|c| !c.is_empty()) {
            let wanted = component.to_lowercase();
            current = self.listing(&current).get(&wanted)?.clone();
        }
        current.is_file().then_some(current)
    }
}

/// Resolve the baseline of every contested path under `base_root`.
pub fn resolve_baselines(conflicts: &ConflictSet, base_root: &Path) -> IndexResult<BaselineMap> {
    let mut resolver = BaselineResolver::new(base_root)?;
    let mut map = BaselineMap::new();
    for path in conflicts.paths() {
        match resolver.resolve(path) {
            Some(location) => {
                debug!(%path, location = %location.display(), "baseline found");
                map.insert(path, location);
            }
            None => debug!(%path, "no baseline"),
        }
    }
    info!(
        contested = conflicts.len(),
        with_baseline = map.len(),
        "baselines resolved"
    );
    Ok(map)
}
