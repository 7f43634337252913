//! Loading every enabled mod under a mod path.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use modweave_types::{decode_text, ModRecord, ModSource};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::archive::{index_source, resolve_case_insensitive};
use crate::descriptor::{parse_manifest, DescriptorLocation, ModDescriptor};
use crate::error::{RegistryError, RegistryResult};
use crate::order::dependency_order;

/// Launcher file listing the enabled mods, relative to the mod path.
pub const MANIFEST_FILE: &str = "settings.txt";

/// A descriptor that was rejected during loading.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkippedMod {
    /// The descriptor reference as written in the manifest.
    pub descriptor: String,
    pub reason: String,
}

/// The outcome of loading a mod path.
#[derive(Clone, Debug, Default)]
pub struct LoadedMods {
    /// Loaded mods in dependency order.
    pub mods: Vec<ModRecord>,
    /// Descriptors that could not be loaded, in manifest order.
    pub skipped: Vec<SkippedMod>,
}

impl LoadedMods {
    pub fn get(&self, name: &str) -> Option<&ModRecord> {
        self.mods.iter().find(|m| m.name() == name)
    }

    /// Mod names in load order.
    pub fn names(&self) -> Vec<&str> {
        self.mods.iter().map(ModRecord::name).collect()
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

/// Loads the mods enabled under one mod path.
#[derive(Clone, Debug)]
pub struct ModRegistry {
    mod_path: PathBuf,
}

impl ModRegistry {
    pub fn new(mod_path: impl Into<PathBuf>) -> Self {
        Self {
            mod_path: mod_path.into(),
        }
    }

    pub fn mod_path(&self) -> &Path {
        &self.mod_path
    }

    /// Load every enabled mod and order them by dependency.
    ///
    /// A broken descriptor only skips that mod. A missing manifest or a
    /// dependency cycle fails the whole load.
    pub fn load(&self) -> RegistryResult<LoadedMods> {
        let manifest_path = resolve_case_insensitive(&self.mod_path, MANIFEST_FILE)
            .ok_or_else(|| RegistryError::ManifestNotFound(self.mod_path.join(MANIFEST_FILE)))?;
        let manifest = decode_text(&fs::read(&manifest_path)?);
        let references = parse_manifest(&manifest);
        info!(
            manifest = %manifest_path.display(),
            enabled = references.len(),
            "reading enabled mods"
        );

        let mut loaded = Vec::new();
        let mut skipped = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for reference in references {
            match self.load_descriptor(&reference) {
                Ok(record) if seen.contains(record.name()) => {
                    warn!(descriptor = %reference, mod_name = record.name(), "duplicate mod name, keeping the first");
                    skipped.push(SkippedMod {
                        descriptor: reference,
                        reason: format!("duplicate mod name {:?}", record.name()),
                    });
                }
                Ok(record) => {
                    debug!(descriptor = %reference, mod_name = record.name(), "loaded mod");
                    seen.insert(record.name().to_string());
                    loaded.push(record);
                }
                Err(e) => {
                    warn!(descriptor = %reference, error = %e, "skipping mod");
                    skipped.push(SkippedMod {
                        descriptor: reference,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let mods = dependency_order(loaded)?;
        info!(loaded = mods.len(), skipped = skipped.len(), "mods loaded");
        Ok(LoadedMods { mods, skipped })
    }

    /// Load one descriptor, referenced relative to the mod path.
    pub fn load_descriptor(&self, reference: &str) -> RegistryResult<ModRecord> {
        let descriptor_path = resolve_case_insensitive(&self.mod_path, reference)
            .ok_or_else(|| RegistryError::LocationNotFound(self.mod_path.join(reference)))?;
        let descriptor = ModDescriptor::parse(&decode_text(&fs::read(&descriptor_path)?));
        let (name, location) = descriptor.validate(&descriptor_path)?;

        let source = match location {
            DescriptorLocation::Archive(rel) => ModSource::Archive(self.locate(&rel)?),
            DescriptorLocation::Directory(rel) => ModSource::Directory(self.locate(&rel)?),
        };
        let tree = index_source(&source)?;

        Ok(ModRecord::new(name, descriptor_path, source, tree)?
            .with_dependencies(descriptor.dependencies)
            .with_replace_paths(descriptor.replace_paths)
            .with_user_dir(descriptor.user_dir))
    }

    /// Descriptor locations are usually relative to the mod path, but some
    /// launchers write absolute ones.
    fn locate(&self, location: &str) -> RegistryResult<PathBuf> {
        let as_path = Path::new(location);
        if as_path.is_absolute() {
            if as_path.exists() {
                return Ok(as_path.to_path_buf());
            }
            return Err(RegistryError::LocationNotFound(as_path.to_path_buf()));
        }
        resolve_case_insensitive(&self.mod_path, location)
            .ok_or_else(|| RegistryError::LocationNotFound(self.mod_path.join(location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::write_zip;

    fn install(dir: &Path, settings: &str) {
        fs::create_dir_all(dir.join("mod")).unwrap();
        fs::write(dir.join("settings.txt"), settings).unwrap();
    }

    #[test]
    fn loads_archive_and_directory_mods_in_dependency_order() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            "last_mods = { \"mod/patch.mod\" \"mod/base.mod\" }",
        );
        fs::write(
            dir.path().join("mod/patch.mod"),
            "name = \"Patch\"\narchive = \"mod/patch.zip\"\ndependencies = { \"Base\" }\n",
        )
        .unwrap();
        write_zip(&dir.path().join("mod/Patch.zip"), &[("common/a.txt", "a")]);

        fs::write(
            dir.path().join("mod/base.mod"),
            "name = \"Base\"\npath = \"mod/base\"\nreplace_path = \"events\"\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("mod/base/common")).unwrap();
        fs::write(dir.path().join("mod/base/common/a.txt"), "a").unwrap();

        let loaded = ModRegistry::new(dir.path()).load().unwrap();
        assert!(loaded.skipped.is_empty());
        assert_eq!(loaded.names(), vec!["Base", "Patch"]);

        let patch = loaded.get("Patch").unwrap();
        assert!(patch.source().is_archive());
        // Archive name is matched ignoring case.
        assert!(patch.archive_location().ends_with("Patch.zip"));
        assert!(patch.provided_paths().contains("common/a.txt"));
        assert_eq!(patch.dependencies(), ["Base".to_string()]);

        let base = loaded.get("Base").unwrap();
        assert_eq!(base.replace_paths(), ["events".to_string()]);
    }

    #[test]
    fn broken_descriptors_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            "last_mods = { \"mod/good.mod\" \"mod/noname.mod\" \"mod/gone.mod\" \"mod/dup.mod\" }",
        );
        fs::write(dir.path().join("mod/good.mod"), "name = \"Good\"\npath = \"mod/good\"").unwrap();
        fs::create_dir_all(dir.path().join("mod/good")).unwrap();
        fs::write(dir.path().join("mod/noname.mod"), "path = \"mod/good\"").unwrap();
        fs::write(dir.path().join("mod/dup.mod"), "name = \"Good\"\npath = \"mod/good\"").unwrap();

        let loaded = ModRegistry::new(dir.path()).load().unwrap();
        assert_eq!(loaded.names(), vec!["Good"]);
        let skipped: Vec<&str> = loaded.skipped.iter().map(|s| s.descriptor.as_str()).collect();
        assert_eq!(skipped, vec!["mod/noname.mod", "mod/gone.mod", "mod/dup.mod"]);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ModRegistry::new(dir.path()).load(),
            Err(RegistryError::ManifestNotFound(_))
        ));
    }

    #[test]
    fn dependency_cycle_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        install(dir.path(), "\"mod/a.mod\" \"mod/b.mod\"");
        for (file, name, dep) in [("a", "A", "B"), ("b", "B", "A")] {
            fs::create_dir_all(dir.path().join(format!("mod/{file}"))).unwrap();
            fs::write(
                dir.path().join(format!("mod/{file}.mod")),
                format!("name = \"{name}\"\npath = \"mod/{file}\"\ndependencies = {{ \"{dep}\" }}"),
            )
            .unwrap();
        }
        assert!(matches!(
            ModRegistry::new(dir.path()).load(),
            Err(RegistryError::DependencyCycle(_))
        ));
    }
}
