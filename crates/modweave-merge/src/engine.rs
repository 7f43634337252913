//! The per-path merge algorithm.

use modweave_diff::{apply_patch, diff_lines, make_patch, Patch};
use modweave_types::{LineEnding, MergeFailure, MergeOutcome};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize::{normalize_lines, strip_sentinels, with_sentinels, DEFAULT_COMMENT_MARKER};

/// What to do with a contested path the base product does not have.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingBaselinePolicy {
    /// Report the path for manual merging.
    #[default]
    Unmergeable,
    /// Use the first owner's copy as the baseline and merge the others onto it.
    FirstOwner,
}

/// Tunables of the merge engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOptions {
    pub comment_marker: String,
    pub missing_baseline: MissingBaselinePolicy,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            comment_marker: DEFAULT_COMMENT_MARKER.to_string(),
            missing_baseline: MissingBaselinePolicy::default(),
        }
    }
}

/// One owner's patch against the anchor.
#[derive(Clone, Debug)]
pub struct PlannedPatch {
    /// Index of the owner in the order the variants were given.
    pub variant: usize,
    pub patch: Patch,
}

/// Everything needed to merge one path, with patches already in
/// application order.
#[derive(Clone, Debug)]
pub struct MergePlan {
    anchor: Vec<String>,
    line_ending: LineEnding,
    patches: Vec<PlannedPatch>,
    skipped: Vec<usize>,
    anchor_variant: Option<usize>,
}

impl MergePlan {
    /// Normalize inputs, diff every owner against the anchor, and order the
    /// resulting patches by size, smallest first. Equal sizes keep owner
    /// order.
    ///
    /// Owners with no content after normalization contribute nothing and are
    /// listed in [`MergePlan::skipped`].
    pub fn build<S: AsRef<str>>(
        baseline: Option<&str>,
        variants: &[S],
        options: &MergeOptions,
    ) -> Result<Self, MergeFailure> {
        let marker = options.comment_marker.as_str();
        let normalized: Vec<Vec<String>> = variants
            .iter()
            .map(|v| normalize_lines(v.as_ref(), marker))
            .collect();

        let (anchor, line_ending, anchor_variant) = match baseline {
            Some(text) => (
                with_sentinels(normalize_lines(text, marker)),
                LineEnding::detect(text),
                None,
            ),
            None => match options.missing_baseline {
                MissingBaselinePolicy::Unmergeable => return Err(MergeFailure::MissingBaseline),
                MissingBaselinePolicy::FirstOwner => {
                    let (idx, lines) = normalized
                        .iter()
                        .enumerate()
                        .find(|(_, lines)| !lines.is_empty())
                        .ok_or(MergeFailure::MissingBaseline)?;
                    (
                        with_sentinels(lines.clone()),
                        LineEnding::detect(variants[idx].as_ref()),
                        Some(idx),
                    )
                }
            },
        };

        let mut patches = Vec::with_capacity(variants.len());
        let mut skipped = Vec::new();
        for (idx, lines) in normalized.into_iter().enumerate() {
            if Some(idx) == anchor_variant {
                continue;
            }
            if lines.is_empty() {
                debug!(variant = idx, "skipping owner with no content");
                skipped.push(idx);
                continue;
            }
            let script = diff_lines(&anchor, &with_sentinels(lines));
            patches.push(PlannedPatch {
                variant: idx,
                patch: make_patch(&script),
            });
        }
        patches.sort_by_key(|p| p.patch.size());

        Ok(Self {
            anchor,
            line_ending,
            patches,
            skipped,
            anchor_variant,
        })
    }

    /// Owner indices in the order their patches will be applied.
    pub fn order(&self) -> Vec<usize> {
        self.patches.iter().map(|p| p.variant).collect()
    }

    pub fn patches(&self) -> &[PlannedPatch] {
        &self.patches
    }

    /// Owners that were ignored because they had no content.
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }

    /// The owner used as the baseline, when the real baseline was missing.
    pub fn anchor_variant(&self) -> Option<usize> {
        self.anchor_variant
    }

    /// Apply every patch in order onto the anchor.
    ///
    /// A hunk that removes an anchor line an earlier patch already removed
    /// is rejected without being searched for.
    pub fn execute(&self) -> MergeOutcome {
        let mut working = self.anchor.clone();
        let mut claimed = vec![false; self.anchor.len()];
        for planned in &self.patches {
            if planned.patch.is_empty() {
                continue;
            }
            let collisions = planned
                .patch
                .hunks()
                .iter()
                .filter(|hunk| {
                    hunk.removed_positions()
                        .into_iter()
                        .any(|i| claimed.get(i).copied().unwrap_or(false))
                })
                .count();
            if collisions > 0 {
                debug!(variant = planned.variant, collisions, "patch edits claimed lines");
                return MergeOutcome::Unmergeable(MergeFailure::HunksRejected {
                    variant: planned.variant,
                    rejected: collisions,
                    total: planned.patch.len(),
                });
            }
            let result = apply_patch(&planned.patch, &working);
            if !result.all_applied() {
                debug!(
                    variant = planned.variant,
                    rejected = result.rejected(),
                    total = planned.patch.len(),
                    "patch rejected"
                );
                return MergeOutcome::Unmergeable(MergeFailure::HunksRejected {
                    variant: planned.variant,
                    rejected: result.rejected(),
                    total: planned.patch.len(),
                });
            }
            working = result.lines;
            for i in planned.patch.hunks().iter().flat_map(|h| h.removed_positions()) {
                if let Some(slot) = claimed.get_mut(i) {
                    *slot = true;
                }
            }
        }
        MergeOutcome::Merged(self.line_ending.join(&strip_sentinels(&working)))
    }
}

/// Merge every owner's copy of one file against its baseline.
pub fn merge<S: AsRef<str>>(
    baseline: Option<&str>,
    variants: &[S],
    options: &MergeOptions,
) -> MergeOutcome {
    match MergePlan::build(baseline, variants, options) {
        Ok(plan) => plan.execute(),
        Err(failure) => MergeOutcome::Unmergeable(failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> MergeOptions {
        MergeOptions::default()
    }

    fn merged(text: &str) -> MergeOutcome {
        MergeOutcome::Merged(text.to_string())
    }

    #[test]
    fn merges_independent_edits() {
        let base = "A\nB\nC\n";
        let x = "A\nB2\nC\n";
        let y = "A\nB\nC\nD\n";
        assert_eq!(merge(Some(base), &[x, y], &opts()), merged("A\nB2\nC\nD\n"));
    }

    #[test]
    fn same_line_edited_twice_is_unmergeable() {
        let base = "A\nB\nC\n";
        let x = "A\nB2\nC\n";
        let y = "A\nB\nC\nD\n";
        let z = "A\nB3\nC\n";
        let outcome = merge(Some(base), &[x, y, z], &opts());
        assert_eq!(
            outcome,
            MergeOutcome::Unmergeable(MergeFailure::HunksRejected {
                variant: 2,
                rejected: 1,
                total: 1,
            })
        );
    }

    #[test]
    fn same_line_edit_does_not_land_on_a_repeated_line() {
        let base = "a = {\nvalue = 1\n}\nb = {\nvalue = 1\n}\n";
        let x = "a = {\nvalue = 2\n}\nb = {\nvalue = 1\n}\n";
        let z = "a = {\nvalue = 3\n}\nb = {\nvalue = 1\n}\n";
        let outcome = merge(Some(base), &[x, z], &opts());
        assert_eq!(
            outcome,
            MergeOutcome::Unmergeable(MergeFailure::HunksRejected {
                variant: 1,
                rejected: 1,
                total: 1,
            })
        );
    }

    #[test]
    fn same_line_edit_in_repeated_blocks_is_unmergeable() {
        let block = "k = {\nx = yes\n}\n";
        let base = block.repeat(4);
        let first = |value: &str| {
            let mut text = block.replace("yes", value);
            text.push_str(&block.repeat(3));
            text
        };
        let second = |value: &str| {
            let mut text = block.to_string();
            text.push_str(&block.replace("yes", value));
            text.push_str(&block.repeat(2));
            text
        };

        let outcome = merge(Some(base.as_str()), &[first("no"), first("maybe")], &opts());
        assert!(!outcome.is_merged());
        let outcome = merge(Some(base.as_str()), &[second("no"), second("maybe")], &opts());
        assert!(!outcome.is_merged());

        // Edits to different copies of the line still merge.
        let mut expected = block.replace("yes", "no");
        expected.push_str(&block.replace("yes", "maybe"));
        expected.push_str(&block.repeat(2));
        assert_eq!(
            merge(Some(base.as_str()), &[first("no"), second("maybe")], &opts()),
            merged(&expected)
        );
    }

    #[test]
    fn smaller_patch_is_applied_first() {
        let base = "A\nB\nC\n";
        let large = "A\nB3\nC\nD\nE\nF\n";
        let small = "A\nB2\nC\n";

        let plan = MergePlan::build(Some(base), &[large, small], &opts()).unwrap();
        assert_eq!(plan.order(), vec![1, 0]);

        // The small edit lands first, so the large one is the one rejected.
        match plan.execute() {
            MergeOutcome::Unmergeable(MergeFailure::HunksRejected { variant, .. }) => {
                assert_eq!(variant, 0)
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn equal_sizes_keep_owner_order() {
        let base = "a\nb\nc\nd\ne\nf\ng\nh\n";
        let first = "a\nB\nc\nd\ne\nf\ng\nh\n";
        let second = "a\nb\nc\nd\ne\nf\nG\nh\n";
        let plan = MergePlan::build(Some(base), &[first, second], &opts()).unwrap();
        assert_eq!(plan.order(), vec![0, 1]);
        assert_eq!(plan.execute(), merged("a\nB\nc\nd\ne\nf\nG\nh\n"));
    }

    #[test]
    fn one_failing_owner_fails_the_path() {
        let base = "a\nb\nc\nd\ne\nf\ng\nh\n";
        let clean = "a\nb\nc\nd\ne\nf\nG\nh\n";
        let left = "a\nB1\nc\nd\ne\nf\ng\nh\n";
        let right = "a\nB2\nc\nd\ne\nf\ng\nh\n";
        let outcome = merge(Some(base), &[clean, left, right], &opts());
        assert!(!outcome.is_merged());
        assert_eq!(
            outcome.failure(),
            Some(&MergeFailure::HunksRejected {
                variant: 2,
                rejected: 1,
                total: 1,
            })
        );
    }

    #[test]
    fn single_real_edit_is_reproduced() {
        let base = "x = 1\r\ny = 2\r\nz = 3\r\n";
        let edited = "x = 1\r\ny = 5\r\nz = 3\r\n";
        let outcome = merge(Some(base), &[base, edited, base], &opts());
        assert_eq!(outcome, merged(edited));
    }

    #[test]
    fn comments_and_blank_lines_are_not_content() {
        let base = "a = 1 # note\n\n  b = 2\n";
        let variant = "a = 1\nb = 3 # changed\n";
        let other = "# rewritten header\na = 1\nb = 2\n";
        assert_eq!(
            merge(Some(base), &[variant, other], &opts()),
            merged("a = 1\nb = 3\n")
        );
    }

    #[test]
    fn missing_baseline_follows_policy() {
        let owners = ["a\nb\nc\n", "a\nb\nc\nd\n"];
        assert_eq!(
            merge(None, &owners, &opts()),
            MergeOutcome::Unmergeable(MergeFailure::MissingBaseline)
        );

        let first_owner = MergeOptions {
            missing_baseline: MissingBaselinePolicy::FirstOwner,
            ..MergeOptions::default()
        };
        let plan = MergePlan::build(None, &owners, &first_owner).unwrap();
        assert_eq!(plan.anchor_variant(), Some(0));
        assert_eq!(plan.execute(), merged("a\nb\nc\nd\n"));
    }

    #[test]
    fn empty_owners_are_skipped() {
        let base = "a\nb\n";
        let blank = "   \n# only a comment\n";
        let edited = "a\nb2\n";
        let plan = MergePlan::build(Some(base), &[blank, edited], &opts()).unwrap();
        assert_eq!(plan.skipped(), &[0]);
        assert_eq!(plan.execute(), merged("a\nb2\n"));
    }

    #[test]
    fn policy_serializes_snake_case() {
        let json = serde_json::to_string(&MissingBaselinePolicy::FirstOwner).unwrap();
        assert_eq!(json, "\"first_owner\"");
    }

    // ----------------------------------------------------------
    // Script-shaped inputs
    // ----------------------------------------------------------

    const SOURCE: &str =
        "OR = \r\n{\r\n\ttier = KING\r\n\tcash = 240\r\n\treligion = rustacean\r\n}\r\n";

    fn crlf(lines: &[&str]) -> String {
        LineEnding::CrLf.join(lines)
    }

    #[test]
    fn adjacent_line_changes_merge() {
        let change_tier = SOURCE.replace("KING", "COUNT");
        let change_cash = SOURCE.replace("cash = 240", "eggs = 89");
        assert_eq!(
            merge(Some(SOURCE), &[change_tier, change_cash], &opts()),
            MergeOutcome::Merged(crlf(&[
                "OR =",
                "{",
                "tier = COUNT",
                "eggs = 89",
                "religion = rustacean",
                "}"
            ]))
        );
    }

    #[test]
    fn two_removals_merge() {
        let no_tier = SOURCE.replace("\ttier = KING\r\n", "");
        let no_cash = SOURCE.replace("\tcash = 240\r\n", "");
        assert_eq!(
            merge(Some(SOURCE), &[no_tier, no_cash], &opts()),
            MergeOutcome::Merged(crlf(&["OR =", "{", "religion = rustacean", "}"]))
        );
    }

    #[test]
    fn removal_and_expansion_merge() {
        let no_tier = SOURCE.replace("\ttier = KING\r\n", "");
        let expand_cash = SOURCE.replace(
            "\tcash = 240\r\n",
            "\t AND = {\r\n\tbob = jim\r\n\t zoop = zorp}\r\n",
        );
        assert_eq!(
            merge(Some(SOURCE), &[no_tier, expand_cash], &opts()),
            MergeOutcome::Merged(crlf(&[
                "OR =",
                "{",
                "AND = {",
                "bob = jim",
                "zoop = zorp}",
                "religion = rustacean",
                "}"
            ]))
        );
    }

    #[test]
    fn competing_values_fail_in_any_order() {
        let duke = SOURCE.replace("KING", "DUKE");
        let count = SOURCE.replace("KING", "COUNT");
        let emperor = SOURCE.replace("KING", "EMPEROR");

        let forward = merge(Some(SOURCE), &[duke.clone(), count.clone(), emperor], &opts());
        assert!(!forward.is_merged());

        let a = merge(Some(SOURCE), &[duke.clone(), count.clone()], &opts());
        let b = merge(Some(SOURCE), &[count, duke], &opts());
        assert!(!a.is_merged());
        assert!(!b.is_merged());
    }

    #[test]
    fn large_insertion_and_later_edit_merge_in_either_order() {
        let source = "this is some\r\ntext in the middle\r\na lot of content";
        let big = "this is some\r\nAAAA\r\na lot of\r\nsdkj      \t   \r\ntext in the middle\r\na lot of content";
        let small = "this is some\r\ntext in the middle\r\na lot of changes";
        let expected = crlf(&[
            "this is some",
            "AAAA",
            "a lot of",
            "sdkj",
            "text in the middle",
            "a lot of changes",
        ]);

        assert_eq!(
            merge(Some(source), &[big, small], &opts()),
            MergeOutcome::Merged(expected.clone())
        );
        assert_eq!(
            merge(Some(source), &[small, big], &opts()),
            MergeOutcome::Merged(expected)
        );
    }
}
