//! Foundation types for modweave.
//!
//! This crate provides the data model shared by every other modweave crate:
//! what a mod is, which files it provides, which paths are contested, and how
//! a contested path was resolved.
//!
//! # Key Types
//!
//! - [`ModRecord`] -- Identity and provenance of one loaded mod
//! - [`ModSource`] -- Where a mod's files live (archive or unpacked directory)
//! - [`PathTree`] -- The set of relative file paths a mod provides
//! - [`ConflictSet`] / [`ConflictEntry`] -- Contested paths and their owners
//! - [`MergeOutcome`] / [`MergeFailure`] -- Per-path merge result
//! - [`LineEnding`] -- Line-ending convention of a text file

pub mod conflict;
pub mod error;
pub mod outcome;
pub mod path_tree;
pub mod record;
pub mod text;

pub use conflict::{ConflictEntry, ConflictSet};
pub use error::TypeError;
pub use outcome::{MergeFailure, MergeOutcome};
pub use path_tree::{normalize_key, PathTree};
pub use record::{ModRecord, ModSource};
pub use text::{decode_text, encode_text, normalize_line_endings, LineEnding};
