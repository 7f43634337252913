//! Path tree: the set of relative file paths a mod provides.
//!
//! A [`PathTree`] node holds the file names directly inside it and a map of
//! child directories, so paths of any depth can be indexed. Root-level files
//! are never stored: only content inside a top-level directory counts as
//! modding content.
//!
//! Lookups through [`PathTree::contains`] and [`PathTree::subtree`] are
//! case-sensitive. [`PathTree::find_case_insensitive`] resolves a normalized
//! key back to the spelling the mod author actually used.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Normalize a relative path into a conflict key: forward slashes,
/// no empty components, lower-cased.
pub fn normalize_key(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/")
        .to_lowercase()
}

fn components(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|c| !c.is_empty() && *c != ".")
        .collect()
}

/// A directory node in a mod's file index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathTree {
    /// File names directly inside this directory.
    files: BTreeSet<String>,
    /// Child directories, keyed by their name.
    dirs: BTreeMap<String, PathTree>,
}

impl PathTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a listing of archive or directory entries.
    ///
    /// Root-level files are skipped; entries ending in a separator are
    /// treated as directories.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tree = Self::new();
        tree.extend_entries(entries);
        tree
    }

    /// Insert every entry, returning how many were rejected.
    ///
    /// Root-level files and entries containing `..` are rejected; neither is
    /// modding content.
    pub fn extend_entries<I, S>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .filter(|entry| self.insert(entry.as_ref()).is_err())
            .count()
    }

    /// Insert one entry. Returns an error for root-level files and paths
    /// containing `..`.
    pub fn insert(&mut self, path: &str) -> Result<(), TypeError> {
        let is_dir = path.ends_with('/') || path.ends_with('\\');
        let parts = components(path);
        if parts.iter().any(|c| *c == "..") {
            return Err(TypeError::InvalidPath(path.to_string()));
        }

        if is_dir {
            let mut node = self;
            for part in parts {
                node = node.dirs.entry(part.to_string()).or_default();
            }
            return Ok(());
        }

        let Some((file, dirs)) = parts.split_last() else {
            return Err(TypeError::InvalidPath(path.to_string()));
        };
        if dirs.is_empty() {
            return Err(TypeError::InvalidPath(path.to_string()));
        }

        let mut node = self;
        for dir in dirs {
            node = node.dirs.entry((*dir).to_string()).or_default();
        }
        node.files.insert((*file).to_string());
        Ok(())
    }

    /// Returns `true` if the exact relative file path is present.
    pub fn contains(&self, path: &str) -> bool {
        let parts = components(path);
        let Some((file, dirs)) = parts.split_last() else {
            return false;
        };
        let mut node = self;
        for dir in dirs {
            match node.dirs.get(*dir) {
                Some(child) => node = child,
                None => return false,
            }
        }
        node.files.contains(*file)
    }

    /// The directory node at `dir`, matched case-sensitively.
    pub fn subtree(&self, dir: &str) -> Option<&PathTree> {
        let mut node = self;
        for part in components(dir) {
            node = node.dirs.get(part)?;
        }
        Some(node)
    }

    /// Every directory node whose path equals `dir` ignoring case, with the
    /// spelling used by this tree. Two spellings of one directory can coexist
    /// in archives assembled on case-sensitive filesystems.
    pub fn subtrees_ignore_case(&self, dir: &str) -> Vec<(String, &PathTree)> {
        let mut frontier: Vec<(String, &PathTree)> = vec![(String::new(), self)];
        for part in components(dir) {
            let wanted = part.to_lowercase();
            let mut next = Vec::new();
            for (prefix, node) in frontier {
                for (name, child) in &node.dirs {
                    if name.to_lowercase() == wanted {
                        let path = if prefix.is_empty() {
                            name.clone()
                        } else {
                            format!("{prefix}/{name}")
                        };
                        next.push((path, child));
                    }
                }
            }
            frontier = next;
        }
        frontier
    }

    /// File names directly inside this node.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    /// Child directories of this node.
    pub fn dirs(&self) -> impl Iterator<Item = (&str, &PathTree)> {
        self.dirs.iter().map(|(name, tree)| (name.as_str(), tree))
    }

    /// All file paths under this node, relative to it, depth first.
    pub fn walk_files(&self) -> Vec<String> {
        let mut out: Vec<String> = self.files.iter().cloned().collect();
        for (name, child) in &self.dirs {
            out.extend(child.walk_files().into_iter().map(|f| format!("{name}/{f}")));
        }
        out
    }

    /// Total number of files in the tree.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.dirs.values().map(PathTree::file_count).sum::<usize>()
    }

    /// Returns `true` if the tree holds no files.
    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }

    /// Resolve `path` ignoring case, returning the tree's own spelling.
    ///
    /// When several spellings match, the lexicographically first one wins.
    pub fn find_case_insensitive(&self, path: &str) -> Option<String> {
        let parts = components(path);
        let (file, dirs) = parts.split_last()?;
        let dir_path = dirs.join("/");
        let wanted = file.to_lowercase();

        self.subtrees_ignore_case(&dir_path)
            .into_iter()
            .find_map(|(prefix, node)| {
                node.files
                    .iter()
                    .find(|f| f.to_lowercase() == wanted)
                    .map(|f| {
                        if prefix.is_empty() {
                            f.clone()
                        } else {
                            format!("{prefix}/{f}")
                        }
                    })
            })
    }
}
