//! Dependency ordering of loaded mods.

use std::collections::{BTreeSet, HashMap};

use modweave_types::ModRecord;
use tracing::debug;

use crate::error::{RegistryError, RegistryResult};

/// Order `mods` so every mod follows the mods it depends on.
///
/// Kahn's algorithm; among mods that are ready at the same time the one
/// declared first goes first. Dependencies on mods that are not loaded, and
/// a mod depending on itself, are ignored. Mods left unplaced form a cycle
/// and are reported as [`RegistryError::DependencyCycle`].
pub fn dependency_order(mods: Vec<ModRecord>) -> RegistryResult<Vec<ModRecord>> {
    let index: HashMap<&str, usize> = mods
        .iter()
        .enumerate()
        .map(|(i, m)| (m.name(), i))
        .collect();

    let mut in_degree = vec![0usize; mods.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); mods.len()];

    for (i, record) in mods.iter().enumerate() {
        for dep in record.dependencies() {
            match index.get(dep.as_str()) {
                Some(&j) if j == i => {
                    debug!(mod_name = record.name(), "ignoring self-dependency");
                }
                Some(&j) => {
                    in_degree[i] += 1;
                    dependents[j].push(i);
                }
                None => {
                    debug!(mod_name = record.name(), dependency = %dep, "ignoring dependency on a mod that is not loaded");
                }
            }
        }
    }

    // Start with mods that have no loaded dependencies.
    let mut ready: BTreeSet<usize> = (0..mods.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(mods.len());

    while let Some(current) = ready.pop_first() {
        order.push(current);
        for &child in &dependents[current] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.insert(child);
            }
        }
    }

    if order.len() < mods.len() {
        let stuck: Vec<String> = (0..mods.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| mods[i].name().to_string())
            .collect();
        return Err(RegistryError::DependencyCycle(stuck));
    }

    let mut slots: Vec<Option<ModRecord>> = mods.into_iter().map(Some).collect();
    Ok(order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modweave_types::{ModSource, PathTree};

    fn record(name: &str, deps: &[&str]) -> ModRecord {
        ModRecord::new(
            name,
            format!("mod/{name}.mod"),
            ModSource::Directory(name.into()),
            PathTree::new(),
        )
        .unwrap()
        .with_dependencies(deps.iter().copied())
    }

    fn names(mods: &[ModRecord]) -> Vec<&str> {
        mods.iter().map(ModRecord::name).collect()
    }

    #[test]
    fn keeps_declaration_order_without_dependencies() {
        let ordered = dependency_order(vec![record("b", &[]), record("a", &[])]).unwrap();
        assert_eq!(names(&ordered), vec!["b", "a"]);
    }

    #[test]
    fn dependencies_come_first() {
        let ordered = dependency_order(vec![
            record("top", &["mid"]),
            record("mid", &["base"]),
            record("base", &[]),
            record("other", &[]),
        ])
        .unwrap();
        assert_eq!(names(&ordered), vec!["base", "mid", "top", "other"]);
    }

    #[test]
    fn missing_and_self_dependencies_are_ignored() {
        let ordered = dependency_order(vec![
            record("a", &["not installed"]),
            record("b", &["b"]),
        ])
        .unwrap();
        assert_eq!(names(&ordered), vec!["a", "b"]);
    }

    #[test]
    fn cycles_are_reported() {
        let err = dependency_order(vec![
            record("free", &[]),
            record("x", &["y"]),
            record("y", &["x"]),
            record("z", &["x"]),
        ])
        .unwrap_err();
        match err {
            RegistryError::DependencyCycle(stuck) => assert_eq!(stuck, vec!["x", "y", "z"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
