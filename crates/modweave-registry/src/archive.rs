//! Access to a mod's files, packaged or unpacked.
//!
//! Zip archives are read with the `zip` crate and directories are walked
//! with `walkdir`. Entry names are always reported with forward slashes,
//! relative to the archive or directory root.

use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use modweave_types::{ModSource, PathTree};
use tracing::debug;
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::error::{RegistryError, RegistryResult};

/// Resolve `relative` under `base`, tolerating case mismatches on every
/// component. Returns `None` when some component has no match at all.
pub fn resolve_case_insensitive(base: &Path, relative: &str) -> Option<PathBuf> {
    let mut current = base.to_path_buf();
    for component in Path::new(&relative.replace('\\', "/")).components() {
        let Component::Normal(part) = component else {
            continue;
        };
        let exact = current.join(part);
        if exact.exists() {
            current = exact;
            continue;
        }
        let wanted = part.to_string_lossy().to_lowercase();
        let found = fs::read_dir(&current)
            .ok()?
            .filter_map(Result::ok)
            .find(|entry| entry.file_name().to_string_lossy().to_lowercase() == wanted)?;
        current = found.path();
    }
    Some(current)
}

fn open_archive(path: &Path) -> RegistryResult<ZipArchive<BufReader<File>>> {
    let file = File::open(path)?;
    ZipArchive::new(BufReader::new(file)).map_err(|source| RegistryError::Archive {
        path: path.to_path_buf(),
        source,
    })
}

fn list_directory(root: &Path) -> RegistryResult<Vec<String>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| {
            RegistryError::Io(
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(rel) = entry.path().strip_prefix(root) {
            entries.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
    entries.sort();
    Ok(entries)
}

/// Every file entry a mod provides.
pub fn list_entries(source: &ModSource) -> RegistryResult<Vec<String>> {
    match source {
        ModSource::Archive(path) => {
            let archive = open_archive(path)?;
            Ok(archive
                .file_names()
                .filter(|name| !name.ends_with('/'))
                .map(str::to_string)
                .collect())
        }
        ModSource::Directory(path) => list_directory(path),
    }
}

/// Build the path tree of a mod's files. Root-level files are left out.
pub fn index_source(source: &ModSource) -> RegistryResult<PathTree> {
    let entries = list_entries(source)?;
    let mut tree = PathTree::new();
    let rejected = tree.extend_entries(&entries);
    debug!(
        location = %source.location().display(),
        entries = entries.len(),
        indexed = tree.file_count(),
        rejected,
        "indexed mod"
    );
    Ok(tree)
}

/// An open handle onto one mod's files.
///
/// Archive handles are not shared between threads; open one reader per mod
/// and read everything needed before handing texts to parallel work.
pub enum ModReader {
    Archive {
        path: PathBuf,
        archive: ZipArchive<BufReader<File>>,
    },
    Directory(PathBuf),
}

impl ModReader {
    pub fn open(source: &ModSource) -> RegistryResult<Self> {
        match source {
            ModSource::Archive(path) => Ok(Self::Archive {
                path: path.clone(),
                archive: open_archive(path)?,
            }),
            ModSource::Directory(path) => Ok(Self::Directory(path.clone())),
        }
    }

    fn location(&self) -> &Path {
        match self {
            Self::Archive { path, .. } | Self::Directory(path) => path,
        }
    }

    /// Read the raw bytes of `entry`, spelled exactly as the mod spells it.
    pub fn read(&mut self, entry: &str) -> RegistryResult<Vec<u8>> {
        let not_found = |location: &Path| RegistryError::EntryNotFound {
            location: location.to_path_buf(),
            entry: entry.to_string(),
        };
        match self {
            Self::Archive { path, archive } => {
                let mut file = match archive.by_name(entry) {
                    Ok(file) => file,
                    Err(zip::result::ZipError::FileNotFound) => return Err(not_found(path)),
                    Err(source) => {
                        return Err(RegistryError::Archive {
                            path: path.clone(),
                            source,
                        })
                    }
                };
                if file.is_dir() {
                    return Err(not_found(path));
                }
                let mut buf = Vec::with_capacity(file.size() as usize);
                file.read_to_end(&mut buf)?;
                Ok(buf)
            }
            Self::Directory(root) => {
                let full = root.join(entry);
                if !full.is_file() {
                    return Err(not_found(root));
                }
                Ok(fs::read(full)?)
            }
        }
    }

    /// Read every file entry, in listing order.
    pub fn read_all(&mut self) -> RegistryResult<Vec<(String, Vec<u8>)>> {
        let names: Vec<String> = match self {
            Self::Archive { archive, .. } => archive
                .file_names()
                .filter(|name| !name.ends_with('/'))
                .map(str::to_string)
                .collect(),
            Self::Directory(root) => list_directory(root)?,
        };
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let bytes = self.read(&name)?;
            out.push((name, bytes));
        }
        debug!(location = %self.location().display(), files = out.len(), "read mod contents");
        Ok(out)
    }
}
