//! Line edit scripts.
//!
//! Uses the `similar` crate (Myers diff algorithm) over interned line tokens,
//! then runs a semantic cleanup pass: a short run of equal lines squeezed
//! between two larger edits is folded into those edits, so the resulting
//! script describes one coherent change instead of several fragments.

use similar::{capture_diff_slices, Algorithm, DiffOp};

use crate::tokens::LineInterner;

/// One segment of an edit script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Edit {
    /// Lines present in both old and new.
    Equal(Vec<String>),
    /// Lines removed from the old text.
    Delete(Vec<String>),
    /// Lines added in the new text.
    Insert(Vec<String>),
}

impl Edit {
    pub fn lines(&self) -> &[String] {
        match self {
            Self::Equal(l) | Self::Delete(l) | Self::Insert(l) => l,
        }
    }

    pub fn len(&self) -> usize {
        self.lines().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    pub fn is_equal(&self) -> bool {
        matches!(self, Self::Equal(_))
    }
}

/// A line-granular edit script turning an old text into a new one.
///
/// Segments are coalesced: no two adjacent segments share a kind, no segment
/// is empty, and inside each run of changes deletions precede insertions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditScript {
    edits: Vec<Edit>,
}

impl EditScript {
    /// Build a script from raw segments, coalescing them.
    pub fn from_edits(edits: Vec<Edit>) -> Self {
        let mut script = Self { edits };
        script.coalesce();
        script
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Returns `true` if the script changes nothing.
    pub fn is_identity(&self) -> bool {
        self.edits.iter().all(Edit::is_equal)
    }

    /// Reconstruct the old text's lines.
    pub fn old_lines(&self) -> Vec<&str> {
        self.edits
            .iter()
            .filter(|e| !matches!(e, Edit::Insert(_)))
            .flat_map(|e| e.lines().iter().map(String::as_str))
            .collect()
    }

    /// Reconstruct the new text's lines.
    pub fn new_lines(&self) -> Vec<&str> {
        self.edits
            .iter()
            .filter(|e| !matches!(e, Edit::Delete(_)))
            .flat_map(|e| e.lines().iter().map(String::as_str))
            .collect()
    }

    /// Number of inserted lines.
    pub fn additions(&self) -> usize {
        self.edits
            .iter()
            .filter(|e| matches!(e, Edit::Insert(_)))
            .map(Edit::len)
            .sum()
    }

    /// Number of deleted lines.
    pub fn deletions(&self) -> usize {
        self.edits
            .iter()
            .filter(|e| matches!(e, Edit::Delete(_)))
            .map(Edit::len)
            .sum()
    }

    /// Merge adjacent segments of one kind, drop empty ones, and order each
    /// run of changes as all deletions followed by all insertions.
    fn coalesce(&mut self) {
        let mut out: Vec<Edit> = Vec::with_capacity(self.edits.len());
        let mut deleted: Vec<String> = Vec::new();
        let mut inserted: Vec<String> = Vec::new();

        let flush = |out: &mut Vec<Edit>, deleted: &mut Vec<String>, inserted: &mut Vec<String>| {
            if !deleted.is_empty() {
                out.push(Edit::Delete(std::mem::take(deleted)));
            }
            if !inserted.is_empty() {
                out.push(Edit::Insert(std::mem::take(inserted)));
            }
        };

        for edit in self.edits.drain(..) {
            match edit {
                Edit::Delete(lines) => deleted.extend(lines),
                Edit::Insert(lines) => inserted.extend(lines),
                Edit::Equal(lines) => {
                    if lines.is_empty() {
                        continue;
                    }
                    flush(&mut out, &mut deleted, &mut inserted);
                    match out.last_mut() {
                        Some(Edit::Equal(prev)) => prev.extend(lines),
                        _ => out.push(Edit::Equal(lines)),
                    }
                }
            }
        }
        flush(&mut out, &mut deleted, &mut inserted);
        self.edits = out;
    }

    /// Fold equalities that are no longer than the edits on both sides of
    /// them into those edits. Repeats until nothing changes.
    fn cleanup_semantic(&mut self) {
        loop {
            let Some(idx) = self.find_trivial_equality() else {
                break;
            };
            let Edit::Equal(lines) = self.edits.remove(idx) else {
                break;
            };
            self.edits.insert(idx, Edit::Insert(lines.clone()));
            self.edits.insert(idx, Edit::Delete(lines));
            self.coalesce();
        }
    }

    fn find_trivial_equality(&self) -> Option<usize> {
        let change_weight = |run: &[Edit]| -> usize {
            let deleted: usize = run
                .iter()
                .filter(|e| matches!(e, Edit::Delete(_)))
                .map(Edit::len)
                .sum();
            let inserted: usize = run
                .iter()
                .filter(|e| matches!(e, Edit::Insert(_)))
                .map(Edit::len)
                .sum();
            deleted.max(inserted)
        };

        for (idx, edit) in self.edits.iter().enumerate() {
            if !edit.is_equal() || idx == 0 || idx + 1 == self.edits.len() {
                continue;
            }
            let run_start = self.edits[..idx]
                .iter()
                .rposition(Edit::is_equal)
                .map_or(0, |p| p + 1);
            let run_end = self.edits[idx + 1..]
                .iter()
                .position(Edit::is_equal)
                .map_or(self.edits.len(), |p| idx + 1 + p);

            let before = change_weight(&self.edits[run_start..idx]);
            let after = change_weight(&self.edits[idx + 1..run_end]);
            if edit.len() <= before && edit.len() <= after {
                return Some(idx);
            }
        }
        None
    }
}

/// Compute a line edit script from `old` to `new`.
pub fn diff_lines<S: AsRef<str>>(old: &[S], new: &[S]) -> EditScript {
    let mut interner = LineInterner::new();
    let old_tokens = interner.tokenize(old);
    let new_tokens = interner.tokenize(new);

    let collect = |tokens: &[u32]| -> Vec<String> {
        tokens
            .iter()
            .filter_map(|t| interner.resolve(*t))
            .map(str::to_string)
            .collect()
    };

    let mut edits = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old_tokens, &new_tokens) {
        match op {
            DiffOp::Equal { old_index, len, .. } => {
                edits.push(Edit::Equal(collect(&old_tokens[old_index..old_index + len])));
            }
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                edits.push(Edit::Delete(collect(&old_tokens[old_index..old_index + old_len])));
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                edits.push(Edit::Insert(collect(&new_tokens[new_index..new_index + new_len])));
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                edits.push(Edit::Delete(collect(&old_tokens[old_index..old_index + old_len])));
                edits.push(Edit::Insert(collect(&new_tokens[new_index..new_index + new_len])));
            }
        }
    }

    let mut script = EditScript::from_edits(edits);
    script.cleanup_semantic();
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn identical_texts_are_identity() {
        let a = lines("a b c");
        let script = diff_lines(&a, &a);
        assert!(script.is_identity());
        assert_eq!(script.additions(), 0);
        assert_eq!(script.deletions(), 0);
    }

    #[test]
    fn single_line_replacement() {
        let script = diff_lines(&lines("a b c"), &lines("a X c"));
        assert_eq!(
            script.edits(),
            &[
                Edit::Equal(strs(&["a"])),
                Edit::Delete(strs(&["b"])),
                Edit::Insert(strs(&["X"])),
                Edit::Equal(strs(&["c"])),
            ]
        );
    }

    #[test]
    fn reconstructs_both_sides() {
        let old = lines("a b c d e");
        let new = lines("a c d X e f");
        let script = diff_lines(&old, &new);
        assert_eq!(script.old_lines(), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(script.new_lines(), vec!["a", "c", "d", "X", "e", "f"]);
    }

    #[test]
    fn semantic_cleanup_folds_short_equality() {
        // "b" is sandwiched between two one-line replacements.
        let script = diff_lines(&lines("s a b c s"), &lines("s X b Y s"));
        assert_eq!(
            script.edits(),
            &[
                Edit::Equal(strs(&["s"])),
                Edit::Delete(strs(&["a", "b", "c"])),
                Edit::Insert(strs(&["X", "b", "Y"])),
                Edit::Equal(strs(&["s"])),
            ]
        );
    }

    #[test]
    fn long_equalities_survive_cleanup() {
        let script = diff_lines(&lines("a k1 k2 k3 c"), &lines("X k1 k2 k3 Y"));
        let equal_runs = script.edits().iter().filter(|e| e.is_equal()).count();
        assert_eq!(equal_runs, 1);
        assert_eq!(script.new_lines(), vec!["X", "k1", "k2", "k3", "Y"]);
    }

    #[test]
    fn coalesce_orders_deletions_first() {
        let script = EditScript::from_edits(vec![
            Edit::Insert(strs(&["x"])),
            Edit::Delete(strs(&["a"])),
            Edit::Equal(vec![]),
            Edit::Insert(strs(&["y"])),
            Edit::Equal(strs(&["b"])),
            Edit::Equal(strs(&["c"])),
        ]);
        assert_eq!(
            script.edits(),
            &[
                Edit::Delete(strs(&["a"])),
                Edit::Insert(strs(&["x", "y"])),
                Edit::Equal(strs(&["b", "c"])),
            ]
        );
    }

    #[test]
    fn empty_inputs() {
        let empty: Vec<String> = Vec::new();
        assert!(diff_lines(&empty, &empty).edits().is_empty());
        let script = diff_lines(&empty, &lines("a b"));
        assert_eq!(script.edits(), &[Edit::Insert(strs(&["a", "b"]))]);
    }
}
