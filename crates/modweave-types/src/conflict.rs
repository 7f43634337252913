//! Contested paths and the mods that own them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One contested path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictEntry {
    /// Normalized, lower-cased, forward-slash-joined relative path.
    pub path: String,
    /// Distinct owning mod names, in first-seen order. Always at least two.
    pub owners: Vec<String>,
}

/// All contested paths of a run, ordered by path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictSet {
    entries: BTreeMap<String, Vec<String>>,
}

impl ConflictSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a raw owner map, discarding paths with fewer than
    /// two owners.
    pub fn from_owner_map(map: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        let entries = map
            .into_iter()
            .filter(|(_, owners)| owners.len() >= 2)
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Owners of `path`, if it is contested.
    pub fn owners(&self, path: &str) -> Option<&[String]> {
        self.entries.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Contested paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate `(path, owners)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(path, owners)| (path.as_str(), owners.as_slice()))
    }

    /// Owned entries in path order.
    pub fn entries(&self) -> Vec<ConflictEntry> {
        self.iter()
            .map(|(path, owners)| ConflictEntry {
                path: path.to_string(),
                owners: owners.to_vec(),
            })
            .collect()
    }

    /// Returns `true` if `mod_name` owns at least one contested path.
    pub fn involves(&self, mod_name: &str) -> bool {
        self.entries
            .values()
            .any(|owners| owners.iter().any(|o| o == mod_name))
    }

    /// Contested paths grouped by owning mod.
    pub fn by_mod(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut out: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (path, owners) in &self.entries {
            for owner in owners {
                out.entry(owner.as_str()).or_default().push(path.as_str());
            }
        }
        out
    }
}
