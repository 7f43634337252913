//! Applying patches to drifted text.
//!
//! Each hunk is searched for near the position it had in the text it was
//! computed against, shifted by how far earlier hunks moved things. An exact
//! match of context plus removed lines may sit up to [`MATCH_DISTANCE`] lines
//! away. When none exists, context lines are dropped from the outside in and
//! the trimmed block must then match within [`FUZZ_DISTANCE`] lines of the
//! expected position, since files full of repeated lines hold many copies of
//! a short block. The lines a hunk removes are never dropped. A hunk that only inserts keeps at
//! least one context line on each side that has any. Hunks that still cannot
//! be placed are skipped and reported.

use tracing::debug;

use crate::patch::{Hunk, HunkLine, Patch, CONTEXT_LINES};

/// Context lines that may be dropped from each side of a hunk.
pub const MAX_FUZZ: usize = CONTEXT_LINES;

/// How far from its expected position a hunk with full context may be found.
pub const MATCH_DISTANCE: usize = 1000;

/// How far from its expected position a hunk with trimmed context may be
/// found.
pub const FUZZ_DISTANCE: usize = CONTEXT_LINES;

/// Outcome of [`apply_patch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyResult {
    /// The text after every placeable hunk was applied.
    pub lines: Vec<String>,
    /// One flag per hunk, in patch order.
    pub hunk_results: Vec<bool>,
}

impl ApplyResult {
    pub fn all_applied(&self) -> bool {
        self.hunk_results.iter().all(|ok| *ok)
    }

    /// Number of hunks that could not be placed.
    pub fn rejected(&self) -> usize {
        self.hunk_results.iter().filter(|ok| !**ok).count()
    }
}

/// Apply `patch` to `text`, hunk by hunk.
pub fn apply_patch<S: AsRef<str>>(patch: &Patch, text: &[S]) -> ApplyResult {
    let mut lines: Vec<String> = text.iter().map(|l| l.as_ref().to_string()).collect();
    let mut delta: isize = 0;
    let mut hunk_results = Vec::with_capacity(patch.len());

    for hunk in patch.hunks() {
        hunk_results.push(apply_hunk(hunk, &mut lines, &mut delta));
    }

    ApplyResult {
        lines,
        hunk_results,
    }
}

fn apply_hunk(hunk: &Hunk, lines: &mut Vec<String>, delta: &mut isize) -> bool {
    let old = hunk.old_lines();
    let new = hunk.new_lines();
    let removes = hunk.lines.iter().any(|l| matches!(l, HunkLine::Removed(_)));
    // Pure insertions need some context left to anchor on.
    let keep = usize::from(!removes);
    let lead = hunk.leading_context().saturating_sub(keep);
    let trail = hunk.trailing_context().saturating_sub(keep);

    let mut tried: Option<(usize, usize)> = None;
    for fuzz in 0..=MAX_FUZZ {
        let lead_trim = fuzz.min(lead);
        let trail_trim = fuzz.min(trail);
        if tried == Some((lead_trim, trail_trim)) {
            continue;
        }
        tried = Some((lead_trim, trail_trim));

        let old_block = &old[lead_trim..old.len() - trail_trim];
        let new_block = &new[lead_trim..new.len() - trail_trim];
        let anchor = (hunk.old_start + lead_trim) as isize;
        let expected = (anchor + *delta).clamp(0, lines.len() as isize) as usize;

        let distance = if fuzz == 0 { MATCH_DISTANCE } else { FUZZ_DISTANCE };
        let found = if old_block.is_empty() {
            Some(expected)
        } else {
            find_closest(lines, old_block, expected, distance)
        };

        if let Some(pos) = found {
            lines.splice(
                pos..pos + old_block.len(),
                new_block.iter().map(|l| l.to_string()),
            );
            *delta = pos as isize - anchor + new.len() as isize - old.len() as isize;
            if fuzz > 0 {
                debug!(old_start = hunk.old_start, pos, fuzz, "hunk applied with fuzz");
            }
            return true;
        }
    }
    debug!(old_start = hunk.old_start, "hunk rejected");
    false
}

/// Start index of the occurrence of `block` in `lines` nearest `expected`,
/// at most `max_distance` lines away, preferring the earlier one on a tie.
fn find_closest(
    lines: &[String],
    block: &[&str],
    expected: usize,
    max_distance: usize,
) -> Option<usize> {
    if block.len() > lines.len() {
        return None;
    }
    let last_start = lines.len() - block.len();
    let matches_at = |pos: usize| {
        pos <= last_start
            && lines[pos..pos + block.len()]
                .iter()
                .zip(block)
                .all(|(have, want)| have == want)
    };

    for distance in 0..=max_distance {
        let below = expected.checked_sub(distance);
        let above = expected + distance;
        if below.is_none() && above > last_start {
            break;
        }
        if below.is_some_and(matches_at) {
            return below;
        }
        if distance > 0 && matches_at(above) {
            return Some(above);
        }
    }
    None
}
