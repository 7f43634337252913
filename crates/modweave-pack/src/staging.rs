//! Writing files under an output root and packaging the result.
//!
//! Game data is looked up case-insensitively, so two writes whose paths
//! differ only in case must land in the same file. Existing directory and
//! file names are reused whenever they match ignoring case; new ones keep
//! the caller's spelling.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use modweave_types::encode_text;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackError, PackResult};

/// A directory tree being filled with output files.
#[derive(Clone, Debug)]
pub struct StagingDir {
    root: PathBuf,
}

impl StagingDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Remove everything under the root left by an earlier run.
    pub fn clear(&self) -> PackResult<()> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                debug!(root = %self.root.display(), "cleared staging directory");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// The absolute location `relative` maps to, reusing existing spellings.
    pub fn target(&self, relative: &str) -> PackResult<PathBuf> {
        let unsafe_path = || PackError::UnsafePath(relative.to_string());
        let normalized = relative.replace('\\', "/");
        let mut parts = Vec::new();
        for component in Path::new(&normalized).components() {
            match component {
                Component::Normal(part) => parts.push(part.to_os_string()),
                Component::CurDir => {}
                _ => return Err(unsafe_path()),
            }
        }
        if parts.is_empty() {
            return Err(unsafe_path());
        }

        let mut current = self.root.clone();
        for part in parts {
            let exact = current.join(&part);
            if exact.exists() {
                current = exact;
                continue;
            }
            let wanted = part.to_string_lossy().to_lowercase();
            let existing = fs::read_dir(&current).ok().and_then(|entries| {
                entries
                    .filter_map(Result::ok)
                    .find(|e| e.file_name().to_string_lossy().to_lowercase() == wanted)
                    .map(|e| e.path())
            });
            current = existing.unwrap_or(exact);
        }
        Ok(current)
    }

    /// Write raw bytes to `relative`, replacing any existing file.
    pub fn write(&self, relative: &str, bytes: &[u8]) -> PackResult<PathBuf> {
        let target = self.target(relative)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
        debug!(path = %target.display(), bytes = bytes.len(), "staged file");
        Ok(target)
    }

    /// Write text to `relative`, as Windows-1252 when it fits.
    pub fn write_text(&self, relative: &str, text: &str) -> PackResult<PathBuf> {
        self.write(relative, &encode_text(text))
    }

    /// Every staged file, relative to the root with forward slashes, sorted.
    pub fn files(&self) -> PackResult<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = entry.map_err(|e| {
                PackError::Io(
                    e.into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                )
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&self.root) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Pack every file under `staging` into a deflate-compressed zip at
/// `zip_path`. Returns the number of entries written.
pub fn pack_zip(staging: &StagingDir, zip_path: &Path) -> PackResult<usize> {
    let zip_err = |source: zip::result::ZipError| PackError::Zip {
        path: zip_path.to_path_buf(),
        source,
    };
    if let Some(parent) = zip_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let files = staging.files()?;
    let mut zip = ZipWriter::new(BufWriter::new(File::create(zip_path)?));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for name in &files {
        let bytes = fs::read(staging.root().join(name))?;
        zip.start_file(name.as_str(), options).map_err(zip_err)?;
        zip.write_all(&bytes)?;
    }
    let mut inner = zip.finish().map_err(zip_err)?;
    inner.flush()?;

    info!(archive = %zip_path.display(), entries = files.len(), "packed patch archive");
    Ok(files.len())
}
