//! Summary of one reconciliation run.

use std::path::PathBuf;

use modweave_merge::MergedPath;
use modweave_registry::SkippedMod;
use modweave_types::{MergeFailure, MergeOutcome};
use serde::Serialize;

/// A contested path left for manual merging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnmergeableEntry {
    pub path: String,
    pub owners: Vec<String>,
    pub reason: MergeFailure,
}

/// What a run found and produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MergeReport {
    pub patch_name: String,
    /// Loaded mods in load order.
    pub mods: Vec<String>,
    pub skipped: Vec<SkippedMod>,
    /// Number of contested paths.
    pub conflicts: usize,
    /// Paths merged automatically, sorted.
    pub merged: Vec<String>,
    pub unmergeable: Vec<UnmergeableEntry>,
    pub dry_run: bool,
    /// Root of the written output, absent for dry runs.
    pub output: Option<PathBuf>,
}

impl MergeReport {
    pub fn new(patch_name: impl Into<String>) -> Self {
        Self {
            patch_name: patch_name.into(),
            ..Self::default()
        }
    }

    /// Sort merge results into the merged and unmergeable lists.
    pub fn record_results(&mut self, results: &[MergedPath]) {
        for result in results {
            match &result.outcome {
                MergeOutcome::Merged(_) => self.merged.push(result.path.clone()),
                MergeOutcome::Unmergeable(reason) => self.unmergeable.push(UnmergeableEntry {
                    path: result.path.clone(),
                    owners: result.owners.clone(),
                    reason: reason.clone(),
                }),
            }
        }
    }

    /// Percentage of contested paths that did not need manual merging.
    pub fn success_rate(&self) -> f64 {
        if self.conflicts == 0 {
            return 100.0;
        }
        100.0 - 100.0 * self.unmergeable.len() as f64 / self.conflicts as f64
    }

    /// The closing line printed after a run.
    pub fn summary(&self) -> String {
        if self.unmergeable.is_empty() {
            "All merges completed automatically.".to_string()
        } else {
            format!("{:.2}% of merges completed automatically.", self.success_rate())
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(path: &str, outcome: MergeOutcome) -> MergedPath {
        MergedPath {
            path: path.into(),
            owners: vec!["A".into(), "B".into()],
            outcome,
        }
    }

    fn report_with(results: &[MergedPath]) -> MergeReport {
        let mut report = MergeReport::new("Patch");
        report.conflicts = results.len();
        report.record_results(results);
        report
    }

    #[test]
    fn no_conflicts_is_full_success() {
        let report = MergeReport::new("Patch");
        assert_eq!(report.success_rate(), 100.0);
        assert_eq!(report.summary(), "All merges completed automatically.");
    }

    #[test]
    fn partial_success_rate() {
        let report = report_with(&[
            result("a.txt", MergeOutcome::Merged("x\n".into())),
            result("b.txt", MergeOutcome::Merged("y\n".into())),
            result("c.txt", MergeOutcome::Merged("z\n".into())),
            result("d.txt", MergeOutcome::Unmergeable(MergeFailure::MissingBaseline)),
        ]);
        assert_eq!(report.merged, vec!["a.txt", "b.txt", "c.txt"]);
        assert_eq!(report.unmergeable.len(), 1);
        assert_eq!(report.success_rate(), 75.0);
        assert_eq!(report.summary(), "75.00% of merges completed automatically.");
    }

    #[test]
    fn json_carries_failure_kind() {
        let report = report_with(&[result(
            "common/x.txt",
            MergeOutcome::Unmergeable(MergeFailure::HunksRejected {
                variant: 1,
                rejected: 1,
                total: 2,
            }),
        )]);
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["conflicts"], 1);
        assert_eq!(value["unmergeable"][0]["path"], "common/x.txt");
        assert_eq!(value["unmergeable"][0]["reason"]["kind"], "hunks_rejected");
        assert_eq!(value["unmergeable"][0]["reason"]["variant"], 1);
        assert_eq!(value["output"], serde_json::Value::Null);
    }
}
