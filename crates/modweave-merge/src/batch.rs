//! Parallel merging of many contested paths.
//!
//! Paths share no state, so each job runs independently on a rayon pool.
//! Jobs carry fully materialized texts; nothing here touches archives.

use modweave_types::MergeOutcome;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::engine::{merge, MergeOptions};
use crate::error::MergeResult;

/// One contested path with every text needed to merge it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeJob {
    pub path: String,
    /// Owning mods, in load order.
    pub owners: Vec<String>,
    /// Baseline text, if the base product has this file.
    pub baseline: Option<String>,
    /// One text per owner, parallel to `owners`.
    pub variants: Vec<String>,
}

/// The outcome of one [`MergeJob`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedPath {
    pub path: String,
    pub owners: Vec<String>,
    pub outcome: MergeOutcome,
}

fn run_job(job: &MergeJob, options: &MergeOptions) -> MergedPath {
    let outcome = merge(job.baseline.as_deref(), &job.variants, options);
    match &outcome {
        MergeOutcome::Merged(_) => debug!(path = %job.path, "merged"),
        MergeOutcome::Unmergeable(failure) => {
            debug!(path = %job.path, owners = ?job.owners, %failure, "unmergeable")
        }
    }
    MergedPath {
        path: job.path.clone(),
        owners: job.owners.clone(),
        outcome,
    }
}

/// Merge every job, using `threads` workers (rayon's global pool when
/// `None`). Results are sorted by path.
pub fn merge_batch(
    jobs: &[MergeJob],
    options: &MergeOptions,
    threads: Option<usize>,
) -> MergeResult<Vec<MergedPath>> {
    let work = || -> Vec<MergedPath> { jobs.par_iter().map(|job| run_job(job, options)).collect() };

    let mut results = match threads {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()?
            .install(work),
        None => work(),
    };
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let merged = results.iter().filter(|r| r.outcome.is_merged()).count();
    info!(
        paths = results.len(),
        merged,
        unmergeable = results.len() - merged,
        "batch merge complete"
    );
    Ok(results)
}
