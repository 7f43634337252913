//! Diff and patch engine for modweave.
//!
//! Computes line-granular edit scripts between two texts, turns them into
//! context-anchored patches, and applies patches to drifted copies of the
//! original text while reporting success per hunk.
//!
//! # Key Types
//!
//! - [`LineInterner`] -- Maps whole lines to atomic tokens and back
//! - [`EditScript`] / [`Edit`] -- Line diff with semantic cleanup
//! - [`Patch`] / [`Hunk`] / [`HunkLine`] -- Context-anchored hunks
//! - [`ApplyResult`] -- Patched lines plus per-hunk success flags

pub mod apply;
pub mod edit;
pub mod patch;
pub mod tokens;

pub use apply::{apply_patch, ApplyResult, FUZZ_DISTANCE, MATCH_DISTANCE, MAX_FUZZ};
pub use edit::{diff_lines, Edit, EditScript};
pub use patch::{make_patch, Hunk, HunkLine, Patch, CONTEXT_LINES};
pub use tokens::LineInterner;
