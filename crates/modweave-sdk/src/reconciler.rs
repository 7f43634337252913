//! The end-to-end pipeline: load, detect, resolve, merge, assemble.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use modweave_index::{resolve_baselines, BaselineMap, ConflictDetector};
use modweave_merge::{merge_batch, MergeJob, MergedPath};
use modweave_pack::{AssembledOutput, MergeReport, OutputAssembler};
use modweave_registry::{LoadedMods, ModReader, ModRegistry, RegistryError};
use modweave_types::{decode_text, ConflictSet, ModRecord};
use tracing::{debug, info};

use crate::config::ProductConfig;
use crate::error::SdkResult;

/// Per-run settings that do not live in the config file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// User-facing name of the generated patch mod.
    pub patch_name: String,
    /// Directory the patch mod is written into.
    pub out_dir: PathBuf,
    /// Copy every mod's files into the patch, not just merged ones.
    pub extract: bool,
    /// Stop after conflict detection; write nothing.
    pub dry_run: bool,
    /// Merge worker threads; `None` uses every core.
    pub jobs: Option<usize>,
}

impl ReconcileOptions {
    pub fn new(patch_name: impl Into<String>) -> Self {
        Self {
            patch_name: patch_name.into(),
            out_dir: PathBuf::from("."),
            extract: false,
            dry_run: false,
            jobs: None,
        }
    }
}

/// Everything a run produced.
#[derive(Clone, Debug)]
pub struct Reconciliation {
    pub mods: LoadedMods,
    pub conflicts: ConflictSet,
    pub baselines: BaselineMap,
    /// Merge results sorted by path; empty for dry runs.
    pub results: Vec<MergedPath>,
    /// Written files; `None` for dry runs.
    pub output: Option<AssembledOutput>,
    pub report: MergeReport,
}

/// Runs the pipeline for one product.
#[derive(Clone, Debug)]
pub struct Reconciler {
    config: ProductConfig,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(config: ProductConfig, options: ReconcileOptions) -> Self {
        Self { config, options }
    }

    pub fn config(&self) -> &ProductConfig {
        &self.config
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    pub fn load_mods(&self) -> SdkResult<LoadedMods> {
        Ok(ModRegistry::new(&self.config.modpath).load()?)
    }

    /// Contested paths among `mods`, which must be in load order.
    pub fn detect(&self, mods: &[ModRecord]) -> SdkResult<ConflictSet> {
        let detector = ConflictDetector::new(&self.config.valid_paths)?
            .with_extensions(&self.config.valid_extensions);
        Ok(detector.detect(mods))
    }

    /// Read the baseline and every owner's copy of each contested path.
    ///
    /// Reads are sequential with one open handle per mod; the merge itself
    /// runs in parallel afterwards.
    pub fn build_jobs(
        &self,
        mods: &[ModRecord],
        conflicts: &ConflictSet,
        baselines: &BaselineMap,
    ) -> SdkResult<Vec<MergeJob>> {
        let by_name: HashMap<&str, &ModRecord> = mods.iter().map(|m| (m.name(), m)).collect();
        let mut readers: HashMap<&str, ModReader> = HashMap::new();
        let mut jobs = Vec::with_capacity(conflicts.len());

        for (path, owners) in conflicts.iter() {
            let baseline = match baselines.get(path) {
                Some(location) => Some(decode_text(&fs::read(location)?)),
                None => None,
            };

            let mut variants = Vec::with_capacity(owners.len());
            for owner in owners {
                let record = by_name.get(owner.as_str()).ok_or_else(|| {
                    RegistryError::LocationNotFound(PathBuf::from(owner.as_str()))
                })?;
                let not_found = || RegistryError::EntryNotFound {
                    location: record.archive_location().to_path_buf(),
                    entry: path.to_string(),
                };
                let entry = record
                    .provided_paths()
                    .find_case_insensitive(path)
                    .ok_or_else(not_found)?;

                let reader = match readers.entry(record.name()) {
                    std::collections::hash_map::Entry::Occupied(e) => e.into_mut(),
                    std::collections::hash_map::Entry::Vacant(e) => {
                        e.insert(ModReader::open(record.source())?)
                    }
                };
                variants.push(decode_text(&reader.read(&entry)?));
            }

            debug!(%path, owners = owners.len(), baseline = baseline.is_some(), "job ready");
            jobs.push(MergeJob {
                path: path.to_string(),
                owners: owners.to_vec(),
                baseline,
                variants,
            });
        }
        Ok(jobs)
    }

    pub fn run(&self) -> SdkResult<Reconciliation> {
        let mods = self.load_mods()?;
        let conflicts = self.detect(&mods.mods)?;
        let baselines = resolve_baselines(&conflicts, &self.config.datapath)?;

        let mut report = MergeReport::new(self.options.patch_name.as_str());
        report.mods = mods.names().into_iter().map(str::to_owned).collect();
        report.skipped = mods.skipped.clone();
        report.conflicts = conflicts.len();
        report.dry_run = self.options.dry_run;

        if self.options.dry_run {
            info!(contested = conflicts.len(), "dry run, nothing written");
            return Ok(Reconciliation {
                mods,
                conflicts,
                baselines,
                results: Vec::new(),
                output: None,
                report,
            });
        }

        let assembler = OutputAssembler::new(&self.options.out_dir, self.options.patch_name.as_str())?
            .with_extract(self.options.extract);
        let jobs = self.build_jobs(&mods.mods, &conflicts, &baselines)?;
        let results = merge_batch(&jobs, &self.config.merge_options(), self.options.jobs)?;
        report.record_results(&results);

        let output = assembler.assemble(&mods.mods, &conflicts, &jobs, &results)?;
        report.output = Some(self.options.out_dir.clone());

        info!(
            conflicts = report.conflicts,
            merged = report.merged.len(),
            manual = report.unmergeable.len(),
            "reconciliation complete"
        );
        Ok(Reconciliation {
            mods,
            conflicts,
            baselines,
            results,
            output: Some(output),
            report,
        })
    }
}
