//! Context-anchored patches.
//!
//! A [`Patch`] is a list of [`Hunk`]s. Each hunk records where it started in
//! the old text, the lines it removes and adds, and up to [`CONTEXT_LINES`]
//! unchanged lines on either side used to locate it again in a text that has
//! drifted from the one it was computed against.

use crate::edit::{Edit, EditScript};

/// Unchanged lines kept on each side of a change.
pub const CONTEXT_LINES: usize = 2;

/// One line of a hunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HunkLine {
    Context(String),
    Removed(String),
    Added(String),
}

impl HunkLine {
    pub fn text(&self) -> &str {
        match self {
            Self::Context(s) | Self::Removed(s) | Self::Added(s) => s,
        }
    }

    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context(_))
    }
}

/// A contiguous change plus its surrounding context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hunk {
    /// Zero-based index of the hunk's first line in the old text.
    pub old_start: usize,
    pub lines: Vec<HunkLine>,
}

impl Hunk {
    /// The block this hunk expects to find: context plus removed lines.
    pub fn old_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| !matches!(l, HunkLine::Added(_)))
            .map(HunkLine::text)
            .collect()
    }

    /// The block this hunk leaves behind: context plus added lines.
    pub fn new_lines(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| !matches!(l, HunkLine::Removed(_)))
            .map(HunkLine::text)
            .collect()
    }

    pub fn old_len(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| !matches!(l, HunkLine::Added(_)))
            .count()
    }

    pub fn new_len(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| !matches!(l, HunkLine::Removed(_)))
            .count()
    }

    /// Old-text indices of the lines this hunk removes.
    pub fn removed_positions(&self) -> Vec<usize> {
        let mut pos = self.old_start;
        let mut removed = Vec::new();
        for line in &self.lines {
            match line {
                HunkLine::Context(_) => pos += 1,
                HunkLine::Removed(_) => {
                    removed.push(pos);
                    pos += 1;
                }
                HunkLine::Added(_) => {}
            }
        }
        removed
    }

    /// Context lines before the first change.
    pub fn leading_context(&self) -> usize {
        self.lines.iter().take_while(|l| l.is_context()).count()
    }

    /// Context lines after the last change.
    pub fn trailing_context(&self) -> usize {
        self.lines.iter().rev().take_while(|l| l.is_context()).count()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// An ordered, non-overlapping list of hunks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patch {
    hunks: Vec<Hunk>,
}

impl Patch {
    pub fn new(hunks: Vec<Hunk>) -> Self {
        Self { hunks }
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    /// Number of hunks.
    pub fn len(&self) -> usize {
        self.hunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total number of lines across all hunks, context included.
    ///
    /// Used to order patches from least to most invasive.
    pub fn size(&self) -> usize {
        self.hunks.iter().map(Hunk::len).sum()
    }

    pub fn additions(&self) -> usize {
        self.count(|l| matches!(l, HunkLine::Added(_)))
    }

    pub fn deletions(&self) -> usize {
        self.count(|l| matches!(l, HunkLine::Removed(_)))
    }

    fn count(&self, pred: impl Fn(&HunkLine) -> bool) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| h.lines.iter())
            .filter(|l| pred(l))
            .count()
    }
}

/// Turn an edit script into a patch.
///
/// Equal runs short enough to be covered by the context of the changes on
/// both sides stay inside one hunk; longer runs split the script into
/// separate hunks.
pub fn make_patch(script: &EditScript) -> Patch {
    let edits = script.edits();
    let mut hunks = Vec::new();
    let mut current: Option<Hunk> = None;
    let mut old_pos = 0usize;

    let open_hunk = |idx: usize, old_pos: usize| -> Hunk {
        let lead: Vec<HunkLine> = match idx.checked_sub(1).map(|i| &edits[i]) {
            Some(Edit::Equal(prev)) => prev[prev.len().saturating_sub(CONTEXT_LINES)..]
                .iter()
                .cloned()
                .map(HunkLine::Context)
                .collect(),
            _ => Vec::new(),
        };
        Hunk {
            old_start: old_pos - lead.len(),
            lines: lead,
        }
    };

    for (idx, edit) in edits.iter().enumerate() {
        match edit {
            Edit::Equal(lines) => {
                if let Some(mut hunk) = current.take() {
                    let is_last = idx + 1 == edits.len();
                    if !is_last && lines.len() <= 2 * CONTEXT_LINES {
                        hunk.lines
                            .extend(lines.iter().cloned().map(HunkLine::Context));
                        current = Some(hunk);
                    } else {
                        hunk.lines.extend(
                            lines
                                .iter()
                                .take(CONTEXT_LINES)
                                .cloned()
                                .map(HunkLine::Context),
                        );
                        hunks.push(hunk);
                    }
                }
                old_pos += lines.len();
            }
            Edit::Delete(lines) => {
                let hunk = current.get_or_insert_with(|| open_hunk(idx, old_pos));
                hunk.lines
                    .extend(lines.iter().cloned().map(HunkLine::Removed));
                old_pos += lines.len();
            }
            Edit::Insert(lines) => {
                let hunk = current.get_or_insert_with(|| open_hunk(idx, old_pos));
                hunk.lines.extend(lines.iter().cloned().map(HunkLine::Added));
            }
        }
    }
    if let Some(hunk) = current.take() {
        hunks.push(hunk);
    }

    Patch::new(hunks)
}
