//! Writing a complete patch mod from merge results.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use modweave_merge::{MergeJob, MergedPath};
use modweave_registry::ModReader;
use modweave_types::{ConflictSet, MergeOutcome, ModRecord};
use tracing::{debug, info, warn};

use crate::descriptor::OutputDescriptor;
use crate::error::PackResult;
use crate::naming::flat_name;
use crate::staging::{pack_zip, StagingDir};

/// Suffix of the directory holding manual-merge inputs.
pub const UNMERGED_SUFFIX: &str = "_unmerged";
/// Folder under the manual-merge directory holding baseline copies.
pub const VANILLA_DIR: &str = "vanilla";

/// Where the assembler put everything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssembledOutput {
    pub descriptor: PathBuf,
    pub archive: PathBuf,
    pub staging: PathBuf,
    /// Present when at least one path needs manual merging.
    pub unmerged: Option<PathBuf>,
    /// Files in the staging tree, extracted ones included.
    pub staged_files: usize,
    pub merged: usize,
    pub manual: usize,
}

/// Builds the patch mod under an output directory.
///
/// Layout, with `<flat>` the flattened patch name:
///
/// ```text
/// <out>/<flat>.mod
/// <out>/<flat>.zip
/// <out>/<flat>/...                        merged (and extracted) files
/// <out>/<flat>_unmerged/vanilla/...       baselines of unmergeable paths
/// <out>/<flat>_unmerged/<ModName>/...     each owner's copy
/// ```
#[derive(Clone, Debug)]
pub struct OutputAssembler {
    out_dir: PathBuf,
    patch_name: String,
    flat: String,
    extract: bool,
}

impl OutputAssembler {
    pub fn new(out_dir: impl Into<PathBuf>, patch_name: impl Into<String>) -> PackResult<Self> {
        let patch_name = patch_name.into();
        let flat = flat_name(&patch_name)?;
        Ok(Self {
            out_dir: out_dir.into(),
            patch_name,
            flat,
            extract: false,
        })
    }

    /// Copy every mod's files into the patch before merged files go on top.
    pub fn with_extract(mut self, extract: bool) -> Self {
        self.extract = extract;
        self
    }

    pub fn flat_name(&self) -> &str {
        &self.flat
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.mod", self.flat))
    }

    pub fn archive_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.zip", self.flat))
    }

    pub fn staging_root(&self) -> PathBuf {
        self.out_dir.join(&self.flat)
    }

    pub fn unmerged_root(&self) -> PathBuf {
        self.out_dir.join(format!("{}{UNMERGED_SUFFIX}", self.flat))
    }

    /// The descriptor this assembler writes for `mods` (in load order).
    pub fn descriptor(&self, mods: &[ModRecord], conflicts: &ConflictSet) -> OutputDescriptor {
        let desc = OutputDescriptor::new(self.patch_name.as_str(), &self.flat);
        if self.extract {
            desc.absorb_all(mods)
        } else {
            desc.depend_on_conflicting(mods, conflicts)
        }
    }

    /// Write the whole patch mod.
    ///
    /// `jobs` supply the inputs of unmergeable paths; `results` the merge
    /// outcomes. Both are keyed by contested path. Staging and manual-merge
    /// directories from an earlier run are removed first.
    pub fn assemble(
        &self,
        mods: &[ModRecord],
        conflicts: &ConflictSet,
        jobs: &[MergeJob],
        results: &[MergedPath],
    ) -> PackResult<AssembledOutput> {
        let staging = StagingDir::new(self.staging_root());
        let manual_staging = StagingDir::new(self.unmerged_root());
        staging.clear()?;
        manual_staging.clear()?;
        let by_name: HashMap<&str, &ModRecord> = mods.iter().map(|m| (m.name(), m)).collect();

        if self.extract {
            self.extract_all(mods, &staging)?;
        }

        let jobs_by_path: HashMap<&str, &MergeJob> =
            jobs.iter().map(|j| (j.path.as_str(), j)).collect();
        let mut merged = 0;
        let mut manual = 0;

        for result in results {
            match &result.outcome {
                MergeOutcome::Merged(text) => {
                    let spelling = result
                        .owners
                        .first()
                        .and_then(|owner| by_name.get(owner.as_str()))
                        .and_then(|record| record.provided_paths().find_case_insensitive(&result.path))
                        .unwrap_or_else(|| result.path.clone());
                    staging.write_text(&spelling, text)?;
                    merged += 1;
                }
                MergeOutcome::Unmergeable(failure) => {
                    debug!(path = %result.path, %failure, "staging for manual merge");
                    if let Some(job) = jobs_by_path.get(result.path.as_str()) {
                        self.stage_manual(&manual_staging, job, &by_name)?;
                    }
                    manual += 1;
                }
            }
        }

        let descriptor = self.descriptor_path();
        self.descriptor(mods, conflicts).write_to(&descriptor)?;

        let archive = self.archive_path();
        let staged_files = pack_zip(&staging, &archive)?;

        info!(
            patch = %self.patch_name,
            out_dir = %self.out_dir.display(),
            merged,
            manual,
            staged_files,
            "patch mod assembled"
        );
        Ok(AssembledOutput {
            descriptor,
            archive,
            staging: staging.root().to_path_buf(),
            unmerged: (manual > 0).then(|| manual_staging.root().to_path_buf()),
            staged_files,
            merged,
            manual,
        })
    }

    fn extract_all(&self, mods: &[ModRecord], staging: &StagingDir) -> PackResult<()> {
        for record in mods {
            // Unreadable mods only lose their verbatim copy.
            let contents = ModReader::open(record.source()).and_then(|mut r| r.read_all());
            let contents = match contents {
                Ok(contents) => contents,
                Err(e) => {
                    warn!(mod_name = %record.name(), error = %e, "skipping extraction");
                    continue;
                }
            };
            let mut copied = 0;
            for (entry, bytes) in contents {
                // Root-level files (descriptors, thumbnails) are not content.
                if !entry.trim_matches('/').contains('/') {
                    continue;
                }
                staging.write(&entry, &bytes)?;
                copied += 1;
            }
            debug!(mod_name = %record.name(), copied, "extracted mod");
        }
        Ok(())
    }

    fn stage_manual(
        &self,
        staging: &StagingDir,
        job: &MergeJob,
        by_name: &HashMap<&str, &ModRecord>,
    ) -> PackResult<()> {
        if let Some(baseline) = &job.baseline {
            staging.write_text(&format!("{VANILLA_DIR}/{}", job.path), baseline)?;
        }
        for (owner, text) in job.owners.iter().zip(&job.variants) {
            let folder = match by_name.get(owner.as_str()) {
                Some(record) => record.folder_name(),
                None => owner.chars().filter(char::is_ascii_alphanumeric).collect(),
            };
            staging.write_text(&format!("{folder}/{}", job.path), text)?;
        }
        Ok(())
    }
}
