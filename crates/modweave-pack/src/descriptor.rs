//! The synthetic `.mod` descriptor of the patch.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use modweave_types::{ConflictSet, ModRecord};
use tracing::debug;

use crate::error::PackResult;
use crate::naming::quote_dependency;

/// Contents of the patch's descriptor file.
///
/// The launcher places a mod after everything it depends on, so listing the
/// conflicting mods as dependencies makes the patch win every contested path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputDescriptor {
    pub name: String,
    /// Archive location relative to the mod path, e.g. `mod/patch.zip`.
    pub archive: String,
    pub user_dir: Option<String>,
    /// Mod names in load order.
    pub dependencies: Vec<String>,
    pub replace_paths: Vec<String>,
}

impl OutputDescriptor {
    /// Descriptor for a patch named `patch_name` packaged as `<flat>.zip`.
    pub fn new(patch_name: impl Into<String>, flat: &str) -> Self {
        Self {
            name: patch_name.into(),
            archive: format!("mod/{flat}.zip"),
            ..Self::default()
        }
    }

    /// Depend on every mod that owns a contested path, in load order.
    pub fn depend_on_conflicting(mut self, mods: &[ModRecord], conflicts: &ConflictSet) -> Self {
        self.dependencies = mods
            .iter()
            .filter(|m| conflicts.involves(m.name()))
            .map(|m| m.name().to_string())
            .collect();
        self
    }

    /// Depend on every mod and carry over their replace paths and user
    /// directory. Used when the patch replaces the whole mod set.
    pub fn absorb_all(mut self, mods: &[ModRecord]) -> Self {
        self.dependencies = mods.iter().map(|m| m.name().to_string()).collect();
        self.replace_paths.clear();
        for record in mods {
            for path in record.replace_paths() {
                if !self.replace_paths.contains(path) {
                    self.replace_paths.push(path.clone());
                }
            }
        }
        // A descriptor holds a single user_dir; the first mod to set one wins.
        self.user_dir = mods.iter().find_map(|m| m.user_dir()).map(str::to_string);
        if let Some(dir) = &self.user_dir {
            for other in mods.iter().filter_map(|m| m.user_dir()).filter(|d| *d != dir.as_str()) {
                debug!(kept = %dir, dropped = %other, "conflicting user_dir");
            }
        }
        self
    }

    /// The descriptor in the launcher's key/value syntax.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let name = self.name.replace('"', "'");
        let _ = writeln!(out, "name = \"{name}\"");
        let _ = writeln!(out, "archive = \"{}\"", self.archive);
        if let Some(dir) = &self.user_dir {
            let _ = writeln!(out, "user_dir = \"{dir}\"");
        }
        out.push_str("dependencies = {\n");
        for dep in &self.dependencies {
            let _ = writeln!(out, "{}", quote_dependency(dep));
        }
        out.push_str("}\n");
        for path in &self.replace_paths {
            let _ = writeln!(out, "replace_path = \"{path}\"");
        }
        out
    }

    /// Write the rendered descriptor to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> PackResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render())?;
        debug!(path = %path.display(), dependencies = self.dependencies.len(), "wrote descriptor");
        Ok(())
    }
}
